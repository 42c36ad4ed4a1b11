use clap::{Parser, Subcommand};
use matchdb_core::document::JobSnapshot;
use matchdb_core::{
    config, cosine_similarity, Catalog, Collection, EmbeddingStore, HashEmbedder, MatchOptions,
    Matcher, MatcherConfig,
};
use matchdb_service::catalog_file::CatalogDocument;
use matchdb_service::logging::init_tracing;
use matchdb_service::{ServiceResult, TimedMatcher};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "matchdb", about = "Embedding index and resume/job matcher", version)]
struct Args {
    /// Directory holding resumes.json and jobs.json
    #[arg(short, long, env = "MATCHDB_DATA_DIR", default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Embedding dimension (must match existing snapshots)
    #[arg(long, env = "MATCHDB_DIMENSION", default_value_t = config::DEFAULT_DIMENSION)]
    dimension: usize,

    /// JSON catalog document with "jobs" and "resumes"
    #[arg(short, long, env = "MATCHDB_CATALOG")]
    catalog: Option<PathBuf>,

    /// Per-operation timeout in seconds
    #[arg(long, env = "MATCHDB_TIMEOUT_SECS", default_value_t = config::DEFAULT_OPERATION_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Default minimum score for match listings
    #[arg(long, env = "MATCHDB_MATCH_THRESHOLD", default_value_t = config::DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f64,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show record counts and stored metadata per collection
    Inspect {
        /// Print every record's metadata, not only the counts
        #[arg(long, default_value_t = false)]
        records: bool,
    },
    /// Rank the first stored resume against every stored job, no threshold
    Probe,
    /// Embed every catalog entity and store the vectors
    Index {
        /// Also drop stored embeddings whose entity left the catalog
        #[arg(long, default_value_t = false)]
        prune: bool,
    },
    /// List counterpart matches for one resume or one job
    Match {
        #[arg(long, conflicts_with = "job", required_unless_present = "job")]
        resume: Option<String>,
        #[arg(long)]
        job: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        min_score: Option<f64>,
    },
    /// Similarity between one resume and one job
    Score { resume: String, job: String },
    /// Delete one stored embedding
    Remove { collection: Collection, id: String },
    /// Clear both collections
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_json);

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ServiceResult<()> {
    if !(0.0..=1.0).contains(&args.match_threshold) {
        tracing::warn!(
            threshold = args.match_threshold,
            "match threshold outside [0, 1] will be clamped"
        );
    }

    let catalog: Arc<dyn Catalog> = match &args.catalog {
        Some(path) => Arc::new(CatalogDocument::from_path(path)?.into_catalog()),
        None => Arc::new(CatalogDocument::default().into_catalog()),
    };
    let store = Arc::new(EmbeddingStore::open(&args.data_dir, args.dimension)?);
    let provider = Arc::new(HashEmbedder::new(args.dimension));
    let matcher_config = MatcherConfig {
        match_threshold: args.match_threshold,
        ..MatcherConfig::default()
    };
    let matcher = Arc::new(Matcher::new(store, provider, Arc::clone(&catalog), matcher_config)?);
    let timed = TimedMatcher::new(matcher, Duration::from_secs(args.timeout_secs));

    match args.command {
        Command::Inspect { records } => inspect(&timed, records),
        Command::Probe => probe(&timed),
        Command::Index { prune } => {
            for collection in Collection::ALL {
                let ids = catalog.ids(collection)?;
                let stats = timed.reindex_all(collection, ids).await?;
                let pruned = if prune {
                    timed.prune_stale(collection).await?
                } else {
                    0
                };
                print_json(&json!({
                    "collection": collection,
                    "indexed": stats.indexed,
                    "missing": stats.missing,
                    "pruned": pruned,
                }));
            }
            Ok(())
        }
        Command::Match {
            resume,
            job,
            limit,
            min_score,
        } => {
            let options = MatchOptions { limit, min_score };
            // clap guarantees exactly one of the two.
            let (source, id) = match resume {
                Some(id) => (Collection::Resumes, id),
                None => (Collection::Jobs, job.unwrap_or_default()),
            };
            let matches = timed
                .find_counterpart_matches(source, id.clone(), options)
                .await?;
            print_json(&json!({ "source": source, "id": id, "matches": matches }));
            Ok(())
        }
        Command::Score { resume, job } => {
            let score = timed.calculate_pair_score(resume.clone(), job.clone()).await?;
            print_json(&json!({ "resume": resume, "job": job, "score": score }));
            Ok(())
        }
        Command::Remove { collection, id } => {
            let removed = timed.remove(collection, id.clone()).await?;
            print_json(&json!({ "collection": collection, "id": id, "removed": removed }));
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes {
                eprintln!("Refusing to clear both collections without --yes");
                std::process::exit(2);
            }
            for collection in Collection::ALL {
                let dropped = timed.clear(collection).await?;
                print_json(&json!({ "collection": collection, "dropped": dropped }));
            }
            Ok(())
        }
    }
}

fn inspect(timed: &TimedMatcher, records: bool) -> ServiceResult<()> {
    let store = timed.matcher().store();
    for collection in Collection::ALL {
        let scan = store.scan(collection);
        let mut summary = json!({
            "collection": collection,
            "count": scan.len(),
            "dimension": store.dimension(),
        });
        if records {
            let entries: Vec<_> = scan
                .iter()
                .map(|(id, _, metadata)| json!({ "id": id, "metadata": metadata }))
                .collect();
            summary["records"] = json!(entries);
        }
        print_json(&summary);
    }
    Ok(())
}

fn probe(timed: &TimedMatcher) -> ServiceResult<()> {
    let store = timed.matcher().store();
    let resumes = store.scan(Collection::Resumes);
    let Some((resume_id, resume_vec, _)) = resumes.iter().next() else {
        print_json(&json!({ "probe": "no stored resumes" }));
        return Ok(());
    };
    let jobs = store.scan(Collection::Jobs);
    let ranked = matchdb_core::rank(resume_vec, &jobs, jobs.len(), f64::NEG_INFINITY);
    let scores: Vec<_> = ranked
        .iter()
        .map(|m| {
            json!({
                "job": m.counterpart_id,
                "score": m.score,
                "title": JobSnapshot::from_metadata(&m.metadata).title,
            })
        })
        .collect();
    let self_score = cosine_similarity(resume_vec, resume_vec);
    print_json(&json!({ "resume": resume_id, "self_score": self_score, "jobs": scores }));
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!(error = %e, "failed to render output"),
    }
}
