//! Global tracing subscriber setup.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::formatter::StepFormatter;

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "warn,maze_chase=info";

/// Installs the process-wide subscriber: [`StepFormatter`] output on stderr, filtered by
/// `RUST_LOG`, with span traces captured for errors.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn setup_logging() -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .event_format(StepFormatter)
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)
}
