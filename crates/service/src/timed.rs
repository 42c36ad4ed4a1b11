//! Async facade that bounds every matcher call with a timeout.
//!
//! The core is synchronous and may block on embedding inference and on
//! snapshot I/O. Each call here runs on tokio's blocking pool under
//! `tokio::time::timeout`. A timeout only abandons the wait: the blocking
//! task runs to completion in the background and nothing is retried.

use crate::error::{ServiceError, ServiceResult};
use matchdb_core::{
    Collection, CounterpartMatch, JobPosting, MatchOptions, Matcher, ReindexStats, ResumeProfile,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimedMatcher {
    matcher: Arc<Matcher>,
    timeout: Duration,
}

impl TimedMatcher {
    pub fn new(matcher: Arc<Matcher>, timeout: Duration) -> Self {
        Self { matcher, timeout }
    }

    pub fn matcher(&self) -> &Arc<Matcher> {
        &self.matcher
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Matcher) -> matchdb_core::Result<T> + Send + 'static,
    {
        let matcher = Arc::clone(&self.matcher);
        let task = tokio::task::spawn_blocking(move || f(&matcher));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map_err(ServiceError::from),
            Ok(Err(join_err)) => {
                tracing::error!(operation, error = %join_err, "blocking task failed");
                Err(ServiceError::TaskFailed {
                    operation,
                    reason: join_err.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "operation timed out");
                Err(ServiceError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    pub async fn find_counterpart_matches(
        &self,
        source: Collection,
        id: String,
        options: MatchOptions,
    ) -> ServiceResult<Vec<CounterpartMatch>> {
        self.run("find_counterpart_matches", move |m| {
            m.find_counterpart_matches(source, &id, options)
        })
        .await
    }

    pub async fn matching_jobs_for_resume(
        &self,
        resume_id: String,
        options: MatchOptions,
    ) -> ServiceResult<Vec<CounterpartMatch>> {
        self.find_counterpart_matches(Collection::Resumes, resume_id, options)
            .await
    }

    pub async fn matching_resumes_for_job(
        &self,
        job_id: String,
        options: MatchOptions,
    ) -> ServiceResult<Vec<CounterpartMatch>> {
        self.find_counterpart_matches(Collection::Jobs, job_id, options)
            .await
    }

    pub async fn calculate_pair_score(
        &self,
        resume_id: String,
        job_id: String,
    ) -> ServiceResult<f64> {
        self.run("calculate_pair_score", move |m| {
            m.calculate_pair_score(&resume_id, &job_id)
        })
        .await
    }

    pub async fn index_job(&self, job: JobPosting) -> ServiceResult<()> {
        self.run("index_job", move |m| m.index_job(&job)).await
    }

    pub async fn index_resume(&self, resume: ResumeProfile) -> ServiceResult<()> {
        self.run("index_resume", move |m| m.index_resume(&resume))
            .await
    }

    pub async fn remove(&self, collection: Collection, id: String) -> ServiceResult<bool> {
        self.run("remove", move |m| m.remove(collection, &id)).await
    }

    pub async fn reindex_all(
        &self,
        collection: Collection,
        ids: Vec<String>,
    ) -> ServiceResult<ReindexStats> {
        self.run("reindex_all", move |m| m.reindex_all(collection, &ids))
            .await
    }

    pub async fn prune_stale(&self, collection: Collection) -> ServiceResult<usize> {
        self.run("prune_stale", move |m| m.prune_stale(collection))
            .await
    }

    /// Empty one collection's stored embeddings.
    pub async fn clear(&self, collection: Collection) -> ServiceResult<usize> {
        self.run("clear", move |m| m.store().clear(collection)).await
    }
}
