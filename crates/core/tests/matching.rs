use matchdb_core::catalog::ExperienceItem;
use matchdb_core::{
    Catalog, Collection, EmbeddingProvider, EmbeddingStore, Error, HashEmbedder, InMemoryCatalog,
    JobPosting, MatchOptions, Matcher, MatcherConfig, Result, ResumeProfile,
};
use std::sync::Arc;
use tempfile::TempDir;

fn job(id: &str, title: &str, requirements: &[&str]) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: title.into(),
        company: "Initech".into(),
        description: format!("We are hiring a {title}."),
        requirements: requirements.iter().map(|s| s.to_string()).collect(),
        location: Some("Remote".into()),
        is_active: true,
        ..Default::default()
    }
}

fn resume(id: &str, skills: &[&str], title: &str) -> ResumeProfile {
    ResumeProfile {
        id: id.into(),
        name: Some(format!("Candidate {id}")),
        email: Some(format!("{id}@example.com")),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        experience: vec![ExperienceItem {
            title: Some(title.into()),
            company: Some("Globex".into()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn build(
    dir: &TempDir,
    provider: Arc<dyn EmbeddingProvider>,
    catalog: Arc<InMemoryCatalog>,
) -> Matcher {
    let store = Arc::new(EmbeddingStore::open(dir.path(), provider.dimension()).unwrap());
    Matcher::new(store, provider, catalog, MatcherConfig::default()).unwrap()
}

// ── end-to-end with the hash embedder ──

#[test]
fn test_hash_embedder_ranks_related_job_first() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [
            job("backend", "Backend Engineer", &["rust", "postgres", "kafka"]),
            job("pastry", "Pastry Chef", &["baking", "chocolate", "plating"]),
        ],
        [resume("r1", &["rust", "postgres", "kafka"], "Backend Engineer")],
    ));
    let matcher = build(&dir, Arc::new(HashEmbedder::new(256)), catalog.clone());
    for id in catalog.ids(Collection::Jobs).unwrap() {
        let posting = catalog.job(&id).unwrap().unwrap();
        matcher.index_job(&posting).unwrap();
    }

    let out = matcher
        .matching_jobs_for_resume("r1", MatchOptions::default().with_min_score(0.0))
        .unwrap();
    assert!(!out.is_empty());
    assert_eq!(out[0].id, "backend");
    if out.len() > 1 {
        assert!(out[0].score >= out[1].score);
    }
}

#[test]
fn test_updating_requirements_replaces_vector() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::new());
    let matcher = build(&dir, Arc::new(HashEmbedder::new(64)), catalog);

    let mut posting = job("j1", "Data Engineer", &["python"]);
    matcher.index_job(&posting).unwrap();
    let before = matcher.store().get(Collection::Jobs, "j1").unwrap();

    posting.requirements = vec!["scala".into(), "spark".into()];
    matcher.index_job(&posting).unwrap();
    let after = matcher.store().get(Collection::Jobs, "j1").unwrap();

    assert_ne!(before, after);
    let record = matcher.store().get_record(Collection::Jobs, "j1").unwrap();
    assert_eq!(record.vector, after);
    assert_eq!(record.metadata["requirements"], "scala, spark");
}

#[test]
fn test_index_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("j1", "SRE", &["linux"])],
        [resume("r1", &["linux"], "SRE")],
    ));
    {
        let matcher = build(&dir, Arc::new(HashEmbedder::new(32)), catalog.clone());
        let ids = catalog.ids(Collection::Jobs).unwrap();
        matcher.reindex_all(Collection::Jobs, &ids).unwrap();
        let ids = catalog.ids(Collection::Resumes).unwrap();
        matcher.reindex_all(Collection::Resumes, &ids).unwrap();
    }
    let store = EmbeddingStore::open(dir.path(), 32).unwrap();
    assert_eq!(store.len(Collection::Jobs), 1);
    assert_eq!(store.len(Collection::Resumes), 1);
    let record = store.get_record(Collection::Resumes, "r1").unwrap();
    assert_eq!(record.metadata["name"], "Candidate r1");
}

// ── failure semantics with scripted providers ──

/// Maps a composed text containing `needle` to a fixed vector.
struct Keyword {
    table: Vec<(&'static str, Vec<f64>)>,
}

impl EmbeddingProvider for Keyword {
    fn name(&self) -> &str {
        "keyword"
    }
    fn dimension(&self) -> usize {
        2
    }
    fn embed(&self, text: &str) -> Result<Vec<f64>> {
        Ok(self
            .table
            .iter()
            .find(|(needle, _)| text.contains(needle))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| vec![0.0, 0.0]))
    }
}

fn keyword_provider() -> Arc<Keyword> {
    Arc::new(Keyword {
        table: vec![
            ("Alpha", vec![1.0, 0.0]),
            ("Beta", vec![0.0, 1.0]),
            ("Gamma", vec![0.8, 0.6]),
            ("seeker", vec![1.0, 0.0]),
        ],
    })
}

#[test]
fn test_two_dimensional_threshold_scenario() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J1", "Alpha", &[]), job("J2", "Beta", &[])],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, keyword_provider(), catalog);
    matcher.index_job(&job("J1", "Alpha", &[])).unwrap();
    matcher.index_job(&job("J2", "Beta", &[])).unwrap();

    let out = matcher
        .matching_jobs_for_resume("R", MatchOptions::default().with_limit(5).with_min_score(0.5))
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "J1");
    assert!((out[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn test_inactive_top_match_shrinks_result() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [
            job("J1", "Alpha", &[]),
            job("J2", "Beta", &[]),
            job("J3", "Gamma", &[]),
        ],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, keyword_provider(), catalog.clone());
    for id in ["J1", "J2", "J3"] {
        matcher
            .index_job(&catalog.job(id).unwrap().unwrap())
            .unwrap();
    }
    let opts = MatchOptions::default().with_limit(2).with_min_score(0.0);

    let before = matcher.matching_jobs_for_resume("R", opts).unwrap();
    let ids: Vec<_> = before.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["J1", "J3"]);

    catalog.set_job_active("J1", false);
    let after = matcher.matching_jobs_for_resume("R", opts).unwrap();
    let ids: Vec<_> = after.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["J3"]);
}

#[test]
fn test_fresh_display_fields_come_from_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J1", "Alpha", &[])],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, keyword_provider(), catalog.clone());
    matcher.index_job(&job("J1", "Alpha", &[])).unwrap();

    // Company renamed after indexing; the title still matches the same vector.
    let mut renamed = job("J1", "Alpha", &[]);
    renamed.company = "Initrode".into();
    catalog.upsert_job(renamed);

    let out = matcher
        .matching_jobs_for_resume("R", MatchOptions::default())
        .unwrap();
    let json = serde_json::to_value(&out[0]).unwrap();
    assert_eq!(json["details"]["kind"], "job");
    assert_eq!(json["details"]["company"], "Initrode");
    let stale = matcher.store().get_record(Collection::Jobs, "J1").unwrap();
    assert_eq!(stale.metadata["company"], "Initech");
}

#[test]
fn test_resumes_for_job_and_not_found() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J1", "Alpha", &[])],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, keyword_provider(), catalog.clone());
    matcher
        .index_resume(&catalog.resume("R").unwrap().unwrap())
        .unwrap();

    let out = matcher
        .matching_resumes_for_job("J1", MatchOptions::default())
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "R");

    let err = matcher
        .matching_resumes_for_job("J404", MatchOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn test_pair_score_total_on_missing_entities() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J3", "Gamma", &[])],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, keyword_provider(), catalog);

    let score = matcher.calculate_pair_score("R", "J3").unwrap();
    assert!((score - 0.8).abs() < 1e-9);
    assert_eq!(matcher.calculate_pair_score("R", "missing").unwrap(), 0.0);
    assert_eq!(matcher.calculate_pair_score("missing", "J3").unwrap(), 0.0);
    // Neither side was written back.
    assert!(matcher.store().is_empty(Collection::Resumes));
    assert!(matcher.store().is_empty(Collection::Jobs));
}

struct WrongDimension;

impl EmbeddingProvider for WrongDimension {
    fn name(&self) -> &str {
        "wrong-dimension"
    }
    fn dimension(&self) -> usize {
        2
    }
    fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        Ok(vec![1.0, 0.0, 0.0])
    }
}

#[test]
fn test_provider_dimension_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J1", "Alpha", &[])],
        [],
    ));
    let matcher = build(&dir, Arc::new(WrongDimension), catalog.clone());

    let err = matcher.index_job(&job("J1", "Alpha", &[])).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3, .. }));
    assert!(err.is_fatal());
    assert!(matcher.store().is_empty(Collection::Jobs));

    let ids = catalog.ids(Collection::Jobs).unwrap();
    let err = matcher.reindex_all(Collection::Jobs, &ids).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}

struct Offline;

impl EmbeddingProvider for Offline {
    fn name(&self) -> &str {
        "offline"
    }
    fn dimension(&self) -> usize {
        2
    }
    fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        Err(Error::ProviderUnavailable {
            provider: "offline".into(),
            reason: "model not loaded".into(),
        })
    }
}

#[test]
fn test_provider_failure_surfaces() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(InMemoryCatalog::from_entities(
        [job("J1", "Alpha", &[])],
        [resume("R", &["seeker"], "")],
    ));
    let matcher = build(&dir, Arc::new(Offline), catalog);

    let err = matcher
        .matching_jobs_for_resume("R", MatchOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::ProviderUnavailable { .. }));
    // The pair score stays total only for unresolvable ids, not provider failures.
    assert!(matcher.calculate_pair_score("R", "J1").is_err());
}
