//! sitelog-config
//!
//! User preferences for the site-visit logger and their JSON persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, ReentryMode};
