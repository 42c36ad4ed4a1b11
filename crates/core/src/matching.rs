//! Matching orchestration between resumes and job postings.
//!
//! [`Matcher`] ties the three seams together: the [`EmbeddingStore`] holds
//! cached vectors, the [`EmbeddingProvider`] regenerates them, and the
//! [`Catalog`] is the authority on which entities exist and are active.
//!
//! Query flow:
//!
//! 1. resolve the source entity in the catalog (`NotFound` if absent)
//! 2. take its stored vector, or regenerate one from the entity's current
//!    fields on a cache miss (the regenerated vector is not written back)
//! 3. rank the opposite collection with [`rank`]
//! 4. join each ranked id back to the catalog, dropping ids that vanished
//!    or were deactivated, and attach fresh display fields
//!
//! Step 4 runs after truncation, so a result list may be shorter than the
//! requested limit. Lower-ranked candidates are not pulled in to fill it.

use crate::catalog::{Catalog, Entity, JobPosting, ResumeProfile};
use crate::compose;
use crate::config;
use crate::document::{Collection, Metadata};
use crate::error::{Error, Result};
use crate::provider::{embed_checked, EmbeddingProvider};
use crate::search::{cosine_similarity, rank};
use crate::storage::EmbeddingStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Defaults applied when a caller leaves [`MatchOptions`] fields unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub match_threshold: f64,
    pub max_matches: usize,
    /// Upper bound on any requested limit.
    pub limit_cap: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            match_threshold: config::DEFAULT_MATCH_THRESHOLD,
            max_matches: config::DEFAULT_MAX_MATCHES,
            limit_cap: config::MAX_MATCH_LIMIT,
        }
    }
}

/// Per-call overrides for a listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchOptions {
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
}

impl MatchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

/// Display fields read from the catalog at query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CounterpartDetails {
    Job {
        title: String,
        company: String,
        location: Option<String>,
        salary_min: Option<i64>,
        salary_max: Option<i64>,
    },
    Resume {
        name: Option<String>,
        email: Option<String>,
        skills: Vec<String>,
    },
}

impl From<Entity> for CounterpartDetails {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Job(job) => CounterpartDetails::Job {
                title: job.title,
                company: job.company,
                location: job.location,
                salary_min: job.salary_min,
                salary_max: job.salary_max,
            },
            Entity::Resume(resume) => CounterpartDetails::Resume {
                name: resume.name,
                email: resume.email,
                skills: resume.skills,
            },
        }
    }
}

/// One entry of a listing result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterpartMatch {
    pub id: String,
    pub score: f64,
    pub details: CounterpartDetails,
}

/// Outcome of [`Matcher::reindex_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexStats {
    pub indexed: usize,
    /// Requested ids the catalog did not know.
    pub missing: usize,
}

/// Resolves, embeds, ranks and reconciles matches for both collections.
pub struct Matcher {
    store: Arc<EmbeddingStore>,
    provider: Arc<dyn EmbeddingProvider>,
    catalog: Arc<dyn Catalog>,
    config: MatcherConfig,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("store", &self.store.dir())
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Matcher {
    /// Fails with `DimensionMismatch` if the provider and the store disagree
    /// on D, and with `InvalidConfig` for a non-finite match threshold.
    pub fn new(
        store: Arc<EmbeddingStore>,
        provider: Arc<dyn EmbeddingProvider>,
        catalog: Arc<dyn Catalog>,
        config: MatcherConfig,
    ) -> Result<Self> {
        if provider.dimension() != store.dimension() {
            return Err(Error::DimensionMismatch {
                context: format!("provider '{}' vs store", provider.name()),
                expected: store.dimension(),
                actual: provider.dimension(),
            });
        }
        if !config.match_threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "match threshold {} is not a finite number",
                config.match_threshold
            )));
        }
        Ok(Self {
            store,
            provider,
            catalog,
            config,
        })
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Effective `(limit, min_score)` for a call.
    fn resolve_options(&self, options: MatchOptions) -> (usize, f64) {
        let limit = options
            .limit
            .unwrap_or(self.config.max_matches)
            .min(self.config.limit_cap);
        let min_score = match options.min_score {
            Some(score) if score.is_finite() => score,
            Some(score) => {
                tracing::warn!(
                    requested = score,
                    fallback = self.config.match_threshold,
                    "ignoring non-finite min_score"
                );
                self.config.match_threshold
            }
            None => self.config.match_threshold,
        }
        .clamp(0.0, 1.0);
        (limit, min_score)
    }

    /// Rank the opposite collection against `source_id`.
    ///
    /// An unknown source id is `NotFound`. Counterparts that no longer exist
    /// in the catalog or are inactive are dropped after ranking.
    pub fn find_counterpart_matches(
        &self,
        source: Collection,
        source_id: &str,
        options: MatchOptions,
    ) -> Result<Vec<CounterpartMatch>> {
        let (limit, min_score) = self.resolve_options(options);
        let entity = self
            .catalog
            .entity(source, source_id)?
            .ok_or_else(|| Error::not_found(source, source_id))?;
        let query = self.vector_for(&entity)?;

        let target = source.opposite();
        let scan = self.store.scan(target);
        let ranked = rank(&query, &scan, limit, min_score);
        let ranked_len = ranked.len();

        let mut matches = Vec::with_capacity(ranked_len);
        for candidate in ranked {
            match self.catalog.entity(target, &candidate.counterpart_id)? {
                Some(counterpart) if counterpart.is_active() => matches.push(CounterpartMatch {
                    id: candidate.counterpart_id,
                    score: candidate.score,
                    details: counterpart.into(),
                }),
                Some(_) => {
                    tracing::debug!(
                        collection = %target,
                        id = %candidate.counterpart_id,
                        "dropping inactive counterpart"
                    );
                }
                None => {
                    tracing::debug!(
                        collection = %target,
                        id = %candidate.counterpart_id,
                        "dropping counterpart missing from catalog"
                    );
                }
            }
        }

        tracing::debug!(
            source = %source,
            id = source_id,
            candidates = scan.len(),
            ranked = ranked_len,
            returned = matches.len(),
            limit,
            min_score,
            "counterpart matches computed"
        );
        Ok(matches)
    }

    pub fn matching_jobs_for_resume(
        &self,
        resume_id: &str,
        options: MatchOptions,
    ) -> Result<Vec<CounterpartMatch>> {
        self.find_counterpart_matches(Collection::Resumes, resume_id, options)
    }

    pub fn matching_resumes_for_job(
        &self,
        job_id: &str,
        options: MatchOptions,
    ) -> Result<Vec<CounterpartMatch>> {
        self.find_counterpart_matches(Collection::Jobs, job_id, options)
    }

    /// Cosine similarity between one resume and one job.
    ///
    /// Returns `Ok(0.0)` when either side has neither a stored vector nor a
    /// catalog entry. Provider and dimension failures are still errors.
    pub fn calculate_pair_score(&self, resume_id: &str, job_id: &str) -> Result<f64> {
        let Some(resume_vec) = self.resolve_vector(Collection::Resumes, resume_id)? else {
            tracing::warn!(resume_id, job_id, "resume unresolvable, pair score is 0.0");
            return Ok(0.0);
        };
        let Some(job_vec) = self.resolve_vector(Collection::Jobs, job_id)? else {
            tracing::warn!(resume_id, job_id, "job unresolvable, pair score is 0.0");
            return Ok(0.0);
        };
        Ok(cosine_similarity(&resume_vec, &job_vec))
    }

    /// Stored vector for `id`, else one regenerated from the catalog, else `None`.
    fn resolve_vector(&self, collection: Collection, id: &str) -> Result<Option<Vec<f64>>> {
        if let Some(vector) = self.store.get(collection, id) {
            return Ok(Some(vector));
        }
        match self.catalog.entity(collection, id)? {
            Some(entity) => self.regenerate(&entity).map(Some),
            None => Ok(None),
        }
    }

    fn vector_for(&self, entity: &Entity) -> Result<Vec<f64>> {
        match self.store.get(entity.collection(), entity.id()) {
            Some(vector) => Ok(vector),
            None => self.regenerate(entity),
        }
    }

    /// Embed an entity's current fields without storing the result.
    fn regenerate(&self, entity: &Entity) -> Result<Vec<f64>> {
        tracing::debug!(
            collection = %entity.collection(),
            id = entity.id(),
            "embedding cache miss, regenerating without persisting"
        );
        self.embed_entity(entity)
    }

    fn embed_entity(&self, entity: &Entity) -> Result<Vec<f64>> {
        let text = compose::entity_text(entity);
        let context = format!("{}/{}", entity.collection(), entity.id());
        embed_checked(
            self.provider.as_ref(),
            self.store.dimension(),
            &text,
            &context,
        )
    }

    /// Embed `job` and store it with a fresh snapshot, replacing any previous record.
    pub fn index_job(&self, job: &JobPosting) -> Result<()> {
        let vector = self.embed_entity(&Entity::Job(job.clone()))?;
        self.store
            .put(Collection::Jobs, &job.id, vector, job.snapshot().into_metadata())
    }

    pub fn index_resume(&self, resume: &ResumeProfile) -> Result<()> {
        let vector = self.embed_entity(&Entity::Resume(resume.clone()))?;
        self.store.put(
            Collection::Resumes,
            &resume.id,
            vector,
            resume.snapshot().into_metadata(),
        )
    }

    pub fn index_entity(&self, entity: &Entity) -> Result<()> {
        match entity {
            Entity::Job(job) => self.index_job(job),
            Entity::Resume(resume) => self.index_resume(resume),
        }
    }

    /// Drop the stored embedding for `id`. The catalog entry is not touched.
    pub fn remove(&self, collection: Collection, id: &str) -> Result<bool> {
        self.store.delete(collection, id)
    }

    /// Re-embed `ids` from their current catalog state and store them with
    /// one snapshot write.
    ///
    /// Ids unknown to the catalog are counted and skipped. A provider or
    /// dimension failure aborts the whole run before anything is written.
    pub fn reindex_all(&self, collection: Collection, ids: &[String]) -> Result<ReindexStats> {
        let mut entities = Vec::with_capacity(ids.len());
        let mut stats = ReindexStats::default();
        for id in ids {
            match self.catalog.entity(collection, id)? {
                Some(entity) => entities.push(entity),
                None => {
                    tracing::debug!(collection = %collection, id = %id, "skipping id missing from catalog");
                    stats.missing += 1;
                }
            }
        }

        let texts: Vec<String> = entities.iter().map(compose::entity_text).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.provider.embed_batch(&text_refs)?;
        if vectors.len() != entities.len() {
            return Err(Error::ProviderUnavailable {
                provider: self.provider.name().to_string(),
                reason: format!(
                    "batch returned {} vectors for {} texts",
                    vectors.len(),
                    entities.len()
                ),
            });
        }

        let expected = self.store.dimension();
        let mut entries = Vec::with_capacity(entities.len());
        for (entity, vector) in entities.into_iter().zip(vectors) {
            if vector.len() != expected {
                return Err(Error::DimensionMismatch {
                    context: format!(
                        "provider '{}' for {}/{}",
                        self.provider.name(),
                        collection,
                        entity.id()
                    ),
                    expected,
                    actual: vector.len(),
                });
            }
            let metadata = snapshot_metadata(&entity);
            entries.push((entity.id().to_string(), vector, metadata));
        }

        stats.indexed = self.store.put_many(collection, entries)?;
        tracing::info!(
            collection = %collection,
            indexed = stats.indexed,
            missing = stats.missing,
            "collection reindexed"
        );
        Ok(stats)
    }

    /// Remove stored embeddings whose owning entity left the catalog.
    pub fn prune_stale(&self, collection: Collection) -> Result<usize> {
        let live: BTreeSet<String> = self.catalog.ids(collection)?.into_iter().collect();
        let removed = self.store.retain(collection, |id| live.contains(id))?;
        if removed > 0 {
            tracing::info!(collection = %collection, removed, "pruned stale embeddings");
        }
        Ok(removed)
    }
}

fn snapshot_metadata(entity: &Entity) -> Metadata {
    match entity {
        Entity::Job(job) => job.snapshot().into_metadata(),
        Entity::Resume(resume) => resume.snapshot().into_metadata(),
    }
}
