//! Read-only view of the relational source of truth.
//!
//! The matcher never writes here. It resolves ids to entities, checks the
//! active flag, and reads display fields that are fresher than the metadata
//! snapshots kept next to the vectors. Resumes and jobs reference each other
//! only by id; there are no back-pointers between entity types.

use crate::document::{Collection, JobSnapshot, ResumeSnapshot};
use crate::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_active() -> bool {
    true
}

/// A job posting row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    /// Required skills.
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    /// full-time, part-time, contract, ...
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl JobPosting {
    /// Display snapshot stored next to this posting's vector.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            title: self.title.clone(),
            company: self.company.clone(),
            requirements: self.requirements.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A parsed resume row.
///
/// Resumes carry no deactivation flag; a resume that exists is matchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
}

impl ResumeProfile {
    pub fn snapshot(&self) -> ResumeSnapshot {
        ResumeSnapshot {
            name: self.name.clone(),
            skills: self.skills.join(", "),
        }
    }
}

/// Either kind of catalog entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Job(JobPosting),
    Resume(ResumeProfile),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Job(job) => &job.id,
            Entity::Resume(resume) => &resume.id,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Entity::Job(_) => Collection::Jobs,
            Entity::Resume(_) => Collection::Resumes,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Entity::Job(job) => job.is_active,
            Entity::Resume(_) => true,
        }
    }
}

/// Lookup-by-id access to the relational store.
///
/// `Ok(None)` means the id does not exist; `Err` means the lookup itself
/// failed and should be surfaced as [`Error::Catalog`](crate::Error::Catalog).
pub trait Catalog: Send + Sync {
    fn job(&self, id: &str) -> Result<Option<JobPosting>>;

    fn resume(&self, id: &str) -> Result<Option<ResumeProfile>>;

    /// All ids currently present in `collection`, used for bulk re-indexing.
    fn ids(&self, collection: Collection) -> Result<Vec<String>>;

    fn entity(&self, collection: Collection, id: &str) -> Result<Option<Entity>> {
        Ok(match collection {
            Collection::Jobs => self.job(id)?.map(Entity::Job),
            Collection::Resumes => self.resume(id)?.map(Entity::Resume),
        })
    }
}

/// Catalog held in memory, for tests and for file-backed hosts.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    jobs: RwLock<BTreeMap<String, JobPosting>>,
    resumes: RwLock<BTreeMap<String, ResumeProfile>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(
        jobs: impl IntoIterator<Item = JobPosting>,
        resumes: impl IntoIterator<Item = ResumeProfile>,
    ) -> Self {
        let catalog = Self::new();
        for job in jobs {
            catalog.upsert_job(job);
        }
        for resume in resumes {
            catalog.upsert_resume(resume);
        }
        catalog
    }

    pub fn upsert_job(&self, job: JobPosting) {
        self.jobs.write().insert(job.id.clone(), job);
    }

    pub fn upsert_resume(&self, resume: ResumeProfile) {
        self.resumes.write().insert(resume.id.clone(), resume);
    }

    pub fn remove_job(&self, id: &str) -> Option<JobPosting> {
        self.jobs.write().remove(id)
    }

    pub fn remove_resume(&self, id: &str) -> Option<ResumeProfile> {
        self.resumes.write().remove(id)
    }

    /// Flip a posting's active flag. Returns `false` if the posting does not exist.
    pub fn set_job_active(&self, id: &str, active: bool) -> bool {
        match self.jobs.write().get_mut(id) {
            Some(job) => {
                job.is_active = active;
                true
            }
            None => false,
        }
    }
}

impl Catalog for InMemoryCatalog {
    fn job(&self, id: &str) -> Result<Option<JobPosting>> {
        Ok(self.jobs.read().get(id).cloned())
    }

    fn resume(&self, id: &str) -> Result<Option<ResumeProfile>> {
        Ok(self.resumes.read().get(id).cloned())
    }

    fn ids(&self, collection: Collection) -> Result<Vec<String>> {
        Ok(match collection {
            Collection::Jobs => self.jobs.read().keys().cloned().collect(),
            Collection::Resumes => self.resumes.read().keys().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> JobPosting {
        JobPosting {
            id: id.into(),
            title: "Platform Engineer".into(),
            company: "Initech".into(),
            requirements: vec!["rust".into(), "kubernetes".into()],
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_and_deactivate() {
        let catalog = InMemoryCatalog::from_entities([job("j1")], []);
        assert!(catalog.job("j1").unwrap().unwrap().is_active);
        assert!(catalog.set_job_active("j1", false));
        assert!(!catalog.job("j1").unwrap().unwrap().is_active);
        assert!(!catalog.set_job_active("missing", false));
        assert!(catalog.job("missing").unwrap().is_none());
    }

    #[test]
    fn test_entity_dispatch() {
        let resume = ResumeProfile {
            id: "r1".into(),
            name: Some("Ada".into()),
            ..Default::default()
        };
        let catalog = InMemoryCatalog::from_entities([job("j1")], [resume]);
        let entity = catalog.entity(Collection::Resumes, "r1").unwrap().unwrap();
        assert_eq!(entity.collection(), Collection::Resumes);
        assert_eq!(entity.id(), "r1");
        assert!(entity.is_active());
        assert!(catalog.entity(Collection::Jobs, "r1").unwrap().is_none());
        assert_eq!(catalog.ids(Collection::Jobs).unwrap(), vec!["j1".to_string()]);
    }

    #[test]
    fn test_job_snapshot_joins_requirements() {
        let snap = job("j1").snapshot();
        assert_eq!(snap.requirements, "rust, kubernetes");
        assert_eq!(snap.company, "Initech");
    }

    #[test]
    fn test_job_defaults_to_active_when_deserialized() {
        let job: JobPosting =
            serde_json::from_str(r#"{"id": "j9", "title": "QA", "company": "Hooli"}"#).unwrap();
        assert!(job.is_active);
        assert!(job.requirements.is_empty());
    }
}
