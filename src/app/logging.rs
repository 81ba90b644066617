//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the binary
///
/// Events go to stderr; stdout carries only the streamed answer. `RUST_LOG`
/// takes precedence over the verbosity flags when set.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.show_target())
        .with_thread_ids(config.show_target())
        .with_line_number(config.show_target())
        .try_init();

    if result.is_err() {
        // A subscriber is already installed, e.g. by a test harness.
        return;
    }

    debug!("llmpipe started with verbosity level: {}", config.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
