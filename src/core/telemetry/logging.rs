use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Output goes to stderr since stdout
/// carries the result frames.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
