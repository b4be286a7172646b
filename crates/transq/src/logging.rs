//! Tracing subscriber setup shared by every binary embedding the queue.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// How log output should be rendered.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive used when `RUST_LOG` is not set.
    pub default_directive: String,
    /// Emit one JSON object per line instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            json: false,
        }
    }
}

/// Installs the global subscriber and bridges `log` records into it.
///
/// Returns `false` if a subscriber was already installed; that is not an
/// error, tests and embedding applications routinely initialise twice.
pub fn init_logging(options: &LoggingOptions) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if options.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    match result {
        Ok(()) => {
            log::debug!("Logging initialised (json={})", options.json);
            true
        }
        Err(e) => {
            log::debug!("Logging already initialised: {}", e);
            false
        }
    }
}
