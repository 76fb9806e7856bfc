use tracing_subscriber::EnvFilter;

// Install the global stderr subscriber used for all diagnostics.
// Converter payload is written to stdout, so log lines must never land there.
// Verbosity comes from RUST_LOG and defaults to info.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
