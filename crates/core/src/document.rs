//! Core record types for matchdb.
//!
//! An [`EmbeddingRecord`] pairs a vector with a small denormalized display
//! snapshot. The snapshot is never authoritative: the catalog is, and the
//! snapshot may go stale between re-indexing runs.
//!
//! On disk the snapshot is a flat string map. In code it has a fixed shape
//! per collection ([`JobSnapshot`], [`ResumeSnapshot`]), and the store
//! rejects keys outside that shape.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display snapshot as persisted: string keys to string values.
pub type Metadata = BTreeMap<String, String>;

/// One of the two disjoint entity populations being indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Resumes,
    Jobs,
}

impl Collection {
    /// Both collections, in a stable order.
    pub const ALL: [Collection; 2] = [Collection::Resumes, Collection::Jobs];

    /// The population this one is matched against.
    pub fn opposite(self) -> Collection {
        match self {
            Collection::Resumes => Collection::Jobs,
            Collection::Jobs => Collection::Resumes,
        }
    }

    /// Lower-case name, also used as the snapshot file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Resumes => "resumes",
            Collection::Jobs => "jobs",
        }
    }

    /// Metadata keys a record of this collection may carry.
    pub fn metadata_keys(self) -> &'static [&'static str] {
        match self {
            Collection::Resumes => ResumeSnapshot::KEYS,
            Collection::Jobs => JobSnapshot::KEYS,
        }
    }

    /// Check that `metadata` only uses keys of this collection's snapshot shape.
    pub fn validate_metadata(self, metadata: &Metadata) -> Result<()> {
        let allowed = self.metadata_keys();
        match metadata.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(Error::InvalidMetadata {
                collection: self,
                reason: format!("unexpected key '{key}' (allowed: {})", allowed.join(", ")),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resumes" | "resume" => Ok(Collection::Resumes),
            "jobs" | "job" => Ok(Collection::Jobs),
            other => Err(format!("unknown collection '{other}' (expected resumes or jobs)")),
        }
    }
}

/// A stored vector with its display snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    #[serde(alias = "embedding")]
    pub vector: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: Metadata,
}

/// Accepts `null` values (written by older snapshots for absent fields) and drops them.
fn deserialize_metadata<'de, D>(deserializer: D) -> std::result::Result<Metadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect())
}

impl EmbeddingRecord {
    pub fn new(vector: Vec<f64>, metadata: Metadata) -> Self {
        Self { vector, metadata }
    }
}

/// Display snapshot stored alongside a job posting's vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSnapshot {
    pub title: String,
    pub company: String,
    /// Required skills joined with `", "`.
    pub requirements: String,
}

impl JobSnapshot {
    pub const KEYS: &'static [&'static str] = &["title", "company", "requirements"];

    pub fn into_metadata(self) -> Metadata {
        Metadata::from([
            ("title".to_string(), self.title),
            ("company".to_string(), self.company),
            ("requirements".to_string(), self.requirements),
        ])
    }

    /// Read a snapshot back from a stored map; absent keys become empty strings.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let field = |k: &str| metadata.get(k).cloned().unwrap_or_default();
        Self {
            title: field("title"),
            company: field("company"),
            requirements: field("requirements"),
        }
    }
}

/// Display snapshot stored alongside a resume's vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeSnapshot {
    pub name: Option<String>,
    /// Skills joined with `", "`.
    pub skills: String,
}

impl ResumeSnapshot {
    pub const KEYS: &'static [&'static str] = &["name", "skills"];

    pub fn into_metadata(self) -> Metadata {
        let mut m = Metadata::new();
        if let Some(name) = self.name {
            m.insert("name".to_string(), name);
        }
        m.insert("skills".to_string(), self.skills);
        m
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            name: metadata.get("name").cloned(),
            skills: metadata.get("skills").cloned().unwrap_or_default(),
        }
    }
}
