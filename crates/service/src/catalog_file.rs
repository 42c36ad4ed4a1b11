//! Catalog loaded from a JSON document:
//!
//! ```json
//! { "jobs": [ { "id": "j1", "title": "...", "company": "..." } ],
//!   "resumes": [ { "id": "r1", "skills": ["rust"] } ] }
//! ```

use crate::error::{ServiceError, ServiceResult};
use matchdb_core::{InMemoryCatalog, JobPosting, ResumeProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
    #[serde(default)]
    pub resumes: Vec<ResumeProfile>,
}

impl CatalogDocument {
    pub fn from_path(path: &Path) -> ServiceResult<Self> {
        let err = |reason: String| ServiceError::CatalogFile {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read(path).map_err(|e| err(e.to_string()))?;
        let doc: CatalogDocument = serde_json::from_slice(&raw).map_err(|e| err(e.to_string()))?;
        doc.check_unique_ids().map_err(err)?;
        tracing::info!(
            path = ?path,
            jobs = doc.jobs.len(),
            resumes = doc.resumes.len(),
            "catalog loaded"
        );
        Ok(doc)
    }

    fn check_unique_ids(&self) -> Result<(), String> {
        let mut seen = BTreeSet::new();
        for job in &self.jobs {
            if job.id.is_empty() || !seen.insert(job.id.as_str()) {
                return Err(format!("job id '{}' is empty or duplicated", job.id));
            }
        }
        seen.clear();
        for resume in &self.resumes {
            if resume.id.is_empty() || !seen.insert(resume.id.as_str()) {
                return Err(format!("resume id '{}' is empty or duplicated", resume.id));
            }
        }
        Ok(())
    }

    pub fn into_catalog(self) -> InMemoryCatalog {
        InMemoryCatalog::from_entities(self.jobs, self.resumes)
    }
}
