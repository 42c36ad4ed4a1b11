//! Per-collection state and the two-collection embedding store.
//!
//! Each collection keeps its records behind a copy-on-write pointer:
//! readers clone the current `Arc` and work on that snapshot, writers stage
//! a modified copy, persist it, and only then swap the pointer. A failed
//! write therefore never leaves a partially applied mutation in memory.
//!
//! Writers to the same collection are serialized by a per-collection gate,
//! so two concurrent `put`s cannot lose each other's update. Collections are
//! independent of each other.

use crate::config;
use crate::document::{Collection, EmbeddingRecord, Metadata};
use crate::error::{Error, Result};
use crate::storage::persistence::{load_snapshot, save_snapshot, snapshot_path, Records};
use parking_lot::{Mutex, RwLock};
use std::collections::btree_map;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State of a single collection: the live snapshot pointer and its writer gate.
#[derive(Debug)]
struct CollectionState {
    collection: Collection,
    path: PathBuf,
    records: RwLock<Arc<Records>>,
    /// Held for the whole read-modify-persist-swap cycle of a mutation.
    write_gate: Mutex<()>,
}

impl CollectionState {
    fn open(dir: &Path, collection: Collection, dimension: usize) -> Result<Self> {
        let path = snapshot_path(dir, collection);
        let records = load_snapshot(&path)?.unwrap_or_default();
        for (id, record) in &records {
            validate_record(collection, dimension, id, &record.vector, &record.metadata)?;
        }
        Ok(Self {
            collection,
            path,
            records: RwLock::new(Arc::new(records)),
            write_gate: Mutex::new(()),
        })
    }

    fn snapshot(&self) -> Arc<Records> {
        Arc::clone(&self.records.read())
    }

    /// Apply `f` to a staged copy; persist and publish it if `f` reports a change.
    fn mutate<F>(&self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Records) -> bool,
    {
        let _gate = self.write_gate.lock();
        let mut staged: Records = (*self.snapshot()).clone();
        if !f(&mut staged) {
            return Ok(false);
        }
        save_snapshot(&self.path, &staged)?;
        tracing::trace!(collection = %self.collection, records = staged.len(), "publishing snapshot");
        *self.records.write() = Arc::new(staged);
        Ok(true)
    }
}

fn validate_record(
    collection: Collection,
    dimension: usize,
    id: &str,
    vector: &[f64],
    metadata: &Metadata,
) -> Result<()> {
    if vector.len() != dimension {
        return Err(Error::DimensionMismatch {
            context: format!("{collection}/{id}"),
            expected: dimension,
            actual: vector.len(),
        });
    }
    if let Some(pos) = vector.iter().position(|x| !x.is_finite()) {
        return Err(Error::InvalidVector {
            context: format!("{collection}/{id}"),
            reason: format!("component {pos} is not finite"),
        });
    }
    collection.validate_metadata(metadata)
}

/// Durable mapping of id to (vector, metadata) for resumes and jobs.
///
/// Loaded into memory on [`open`](EmbeddingStore::open). Every mutating call
/// rewrites the collection's full snapshot before returning, so write cost
/// grows with collection size.
#[derive(Debug)]
pub struct EmbeddingStore {
    dir: PathBuf,
    dimension: usize,
    resumes: CollectionState,
    jobs: CollectionState,
}

impl EmbeddingStore {
    /// Open (or create) a store in `dir` whose vectors all have `dimension` components.
    ///
    /// Fails if an existing snapshot holds a record of another dimension or
    /// with metadata outside its collection's shape.
    pub fn open(dir: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if dimension == 0 || dimension > config::MAX_DIMENSION {
            return Err(Error::InvalidConfig(format!(
                "dimension {dimension} outside 1..={}",
                config::MAX_DIMENSION
            )));
        }
        fs::create_dir_all(&dir).map_err(|e| Error::persistence(&dir, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&dir, fs::Permissions::from_mode(0o700));
        }

        let resumes = CollectionState::open(&dir, Collection::Resumes, dimension)?;
        let jobs = CollectionState::open(&dir, Collection::Jobs, dimension)?;
        tracing::info!(
            dir = ?dir,
            dimension,
            resumes = resumes.snapshot().len(),
            jobs = jobs.snapshot().len(),
            "embedding store opened"
        );

        Ok(Self {
            dir,
            dimension,
            resumes,
            jobs,
        })
    }

    fn state(&self, collection: Collection) -> &CollectionState {
        match collection {
            Collection::Resumes => &self.resumes,
            Collection::Jobs => &self.jobs,
        }
    }

    /// Vector dimension shared by both collections.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Directory holding the collection snapshots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Insert or fully replace the record for `id`.
    pub fn put(
        &self,
        collection: Collection,
        id: &str,
        vector: Vec<f64>,
        metadata: Metadata,
    ) -> Result<()> {
        validate_record(collection, self.dimension, id, &vector, &metadata)?;
        let state = self.state(collection);
        state.mutate(|records| {
            records.insert(id.to_string(), EmbeddingRecord::new(vector, metadata));
            true
        })?;
        tracing::debug!(collection = %collection, id, "embedding stored");
        Ok(())
    }

    /// Insert or replace several records with a single snapshot write.
    ///
    /// All records are validated before anything is staged; one bad record
    /// rejects the whole batch.
    pub fn put_many(
        &self,
        collection: Collection,
        entries: Vec<(String, Vec<f64>, Metadata)>,
    ) -> Result<usize> {
        for (id, vector, metadata) in &entries {
            validate_record(collection, self.dimension, id, vector, metadata)?;
        }
        let count = entries.len();
        self.state(collection).mutate(|records| {
            for (id, vector, metadata) in entries {
                records.insert(id, EmbeddingRecord::new(vector, metadata));
            }
            count > 0
        })?;
        tracing::debug!(collection = %collection, count, "embeddings stored");
        Ok(count)
    }

    /// Keep only the records whose id satisfies `keep`. Returns how many were removed.
    pub fn retain<F>(&self, collection: Collection, mut keep: F) -> Result<usize>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = 0;
        self.state(collection).mutate(|records| {
            let before = records.len();
            records.retain(|id, _| keep(id));
            removed = before - records.len();
            removed > 0
        })?;
        Ok(removed)
    }

    /// The stored vector for `id`, if any.
    pub fn get(&self, collection: Collection, id: &str) -> Option<Vec<f64>> {
        self.state(collection)
            .snapshot()
            .get(id)
            .map(|r| r.vector.clone())
    }

    /// The stored vector and metadata for `id`, if any.
    pub fn get_record(&self, collection: Collection, id: &str) -> Option<EmbeddingRecord> {
        self.state(collection).snapshot().get(id).cloned()
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.state(collection).snapshot().contains_key(id)
    }

    /// Remove the record for `id`. Returns `false` (and writes nothing) if it was absent.
    pub fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let removed = self
            .state(collection)
            .mutate(|records| records.remove(id).is_some())?;
        if removed {
            tracing::debug!(collection = %collection, id, "embedding deleted");
        }
        Ok(removed)
    }

    /// Remove every record of `collection`. Returns how many were dropped.
    pub fn clear(&self, collection: Collection) -> Result<usize> {
        let mut dropped = 0;
        self.state(collection).mutate(|records| {
            dropped = records.len();
            records.clear();
            // Rewrite even when already empty so a stale file cannot survive a reset.
            true
        })?;
        tracing::info!(collection = %collection, dropped, "collection cleared");
        Ok(dropped)
    }

    /// Snapshot of `collection` as it is right now.
    ///
    /// The scan can be iterated any number of times and does not observe
    /// later writes.
    pub fn scan(&self, collection: Collection) -> CollectionScan {
        CollectionScan {
            collection,
            records: self.state(collection).snapshot(),
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.state(collection).snapshot().len()
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

/// Point-in-time view of one collection, ordered by ascending id.
#[derive(Debug, Clone)]
pub struct CollectionScan {
    collection: Collection,
    records: Arc<Records>,
}

impl CollectionScan {
    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn iter(&self) -> ScanIter<'_> {
        ScanIter {
            inner: self.records.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CollectionScan {
    type Item = (&'a str, &'a [f64], &'a Metadata);
    type IntoIter = ScanIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`CollectionScan`].
#[derive(Debug, Clone)]
pub struct ScanIter<'a> {
    inner: btree_map::Iter<'a, String, EmbeddingRecord>,
}

impl<'a> Iterator for ScanIter<'a> {
    type Item = (&'a str, &'a [f64], &'a Metadata);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(id, r)| (id.as_str(), r.vector.as_slice(), &r.metadata))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ScanIter<'_> {}
