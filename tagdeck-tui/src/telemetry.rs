//! Log subscriber setup.
//!
//! The terminal belongs to the UI, so events are written as JSON lines to the
//! configured log file instead of stderr.

use crate::error::TuiError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TAGDECK_LOG";
pub const DEFAULT_DIRECTIVES: &str = "tagdeck=info,tagdeck_tui=info,tagdeck_query=info";

pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing(log_path: &Path) -> Result<(), TuiError> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter_from_env())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TuiError::Telemetry(e.to_string()))
}
