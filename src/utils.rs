use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "sitelog=info";

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// `directive`; an unparsable directive falls back to the default.
/// Logs go to stderr so command output stays clean.
pub fn init_tracing(directive: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
