//! # matchdb-core
//!
//! Embedding index and matching engine for resumes and job postings: a
//! durable per-collection vector store, brute-force cosine ranking, and an
//! orchestrator that keeps ranked results consistent with an external
//! relational catalog.
//!
//! This is the core library crate with zero async dependencies. Hosts that
//! need timeouts wrap its blocking calls themselves (see `matchdb-service`).

/// Read-only catalog seam: job postings, resumes, and the `Catalog` trait.
pub mod catalog;
/// Text composition from structured entity fields.
pub mod compose;
/// Global configuration constants: limits, defaults, and file naming.
pub mod config;
/// Core record types: `Collection`, `EmbeddingRecord`, typed metadata snapshots.
pub mod document;
/// Error type and `Result` alias.
pub mod error;
/// `Matcher`: resolve, embed, rank, and reconcile.
pub mod matching;
/// Embedding provider trait and the feature-hashing implementation.
pub mod provider;
/// Search primitives: cosine similarity, ranking, and scored results.
pub mod search;
/// Storage layer: copy-on-write collections and atomic JSON snapshots.
pub mod storage;

pub use catalog::{Catalog, Entity, InMemoryCatalog, JobPosting, ResumeProfile};
pub use document::{Collection, EmbeddingRecord, Metadata};
pub use error::{Error, Result};
pub use matching::{CounterpartDetails, CounterpartMatch, MatchOptions, Matcher, MatcherConfig, ReindexStats};
pub use provider::{EmbeddingProvider, HashEmbedder};
pub use search::{cosine_similarity, rank, MatchResult};
pub use storage::{CollectionScan, EmbeddingStore};
