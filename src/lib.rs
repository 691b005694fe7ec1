#![doc(test(attr(deny(warnings))))]

//! SiteLog records real-estate site visits through a step-by-step entry
//! wizard and keeps them in a CSV table.

pub mod app;
pub mod cli;
pub mod errors;
pub mod utils;

pub use app::{FieldValues, SiteLog, HOME_ENV};
pub use errors::{Result, SiteLogError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Initializes global tracing with `directive` unless `RUST_LOG` is set.
/// Only the first call has any effect.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("SiteLog tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter("sitelog=debug");
    }
}
