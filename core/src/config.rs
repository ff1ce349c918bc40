//! Run configuration.
//!
//! RULE: Built once (by the runner, or `default_test()` in tests) and
//! passed into the engine. Nothing in the core reads the environment.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_API_ENDPOINT: &str = "/public/api/v1/mltr/v3/run";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECENCY_WINDOW_DAYS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// The QA recommender sits behind a self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            endpoint: DEFAULT_API_ENDPOINT.into(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            accept_invalid_certs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// `None` disables recommendations (every employee gets none).
    pub recommender: Option<RecommenderConfig>,
    /// Completion history database. `None` makes the open-assignment and
    /// recency queries "not configured".
    pub history_db: Option<String>,
    /// Where artifacts are written. `None` keeps a run in memory only.
    pub output_dir: Option<String>,
    /// Remove stale files from `output_dir` before writing.
    pub clean_output_dir: bool,
    pub user_completion_template: Option<String>,
    /// JSON catalog file; the built-in catalog when `None`.
    pub catalog_path: Option<String>,
    pub recency_window_days: u32,
    /// Random tag appended to artifact names. 0 keeps the legacy names.
    pub file_tag_len: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            recommender: Some(RecommenderConfig::default()),
            history_db: None,
            output_dir: Some("generated_files".into()),
            clean_output_dir: true,
            user_completion_template: None,
            catalog_path: None,
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            file_tag_len: 0,
        }
    }
}

impl SimConfig {
    /// No network, no files, no history database.
    pub fn default_test() -> Self {
        Self {
            recommender: None,
            history_db: None,
            output_dir: None,
            clean_output_dir: false,
            user_completion_template: None,
            catalog_path: None,
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            file_tag_len: 0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.recency_window_days == 0 {
            return Err("recency_window_days must be at least 1".into());
        }
        if let Some(rec) = &self.recommender {
            if rec.base_url.trim().is_empty() {
                return Err("recommender base_url is empty".into());
            }
            if rec.timeout_secs == 0 {
                return Err("recommender timeout must be at least 1 second".into());
            }
        }
        Ok(())
    }
}
