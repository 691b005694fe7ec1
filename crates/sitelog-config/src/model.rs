use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

const STORE_DIR: &str = "SiteLog";
const STORE_FILE: &str = "site_visits.csv";

/// What the entry flow offers after a record has been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryMode {
    /// Start the next entry empty.
    Blank,
    /// Start the next entry from the one just saved.
    #[default]
    CarryForward,
}

impl fmt::Display for ReentryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReentryMode::Blank => "blank",
            ReentryMode::CarryForward => "carry_forward",
        };
        f.write_str(label)
    }
}

/// User preferences for the site-visit logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Custom location of the visit table. Defaults to `~/Documents/SiteLog/site_visits.csv`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub reentry: ReentryMode,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    /// Disables colored terminal output.
    #[serde(default)]
    pub plain_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            reentry: ReentryMode::default(),
            log_filter: Self::default_log_filter(),
            plain_output: false,
        }
    }
}

impl Config {
    pub fn default_log_filter() -> String {
        "sitelog=info".into()
    }

    pub fn resolve_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(STORE_DIR).join(STORE_FILE)
    }
}
