use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "matchdb_core=info,matchdb_service=info,matchdb=info";

/// Install the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
