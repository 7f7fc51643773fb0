//! `tracing` subscriber setup for the CLI. Logs go to stderr so command output
//! on stdout stays machine readable.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber. `RUST_LOG` wins over `default_level`
/// when set. Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
