use crate::config::LoggingConfig;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber: compact output on stderr, filtered
/// by `RUST_LOG` when set, otherwise by the configured level.
pub fn init_logging(logging: &LoggingConfig) {
    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // Ignore the error if a subscriber is already set (e.g. in tests).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
