//! Configuration for the goal planner
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! JSON config file, and `GOALPLAN_*` environment variables (a `.env` file in
//! the working directory is read first).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adapters::OllamaConfig;
use crate::data::CoreError;
use crate::services::ExtractionOptions;

/// Planner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Directory holding the goal file
    #[serde(default = "default_user_data_dir")]
    pub user_data_dir: PathBuf,

    /// Goal file name inside `user_data_dir`
    #[serde(default = "default_goals_file")]
    pub goals_file: String,

    /// Model used when a request does not pick one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base URL of the text completion server
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Timeout for a single provider request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json_logs: bool,

    /// Check the model list before each extraction
    #[serde(default)]
    pub verify_model: bool,
}

fn default_user_data_dir() -> PathBuf {
    PathBuf::from("User_Data")
}

fn default_goals_file() -> String {
    "goals.json".to_string()
}

fn default_model() -> String {
    "llama2".to_string()
}

fn default_provider_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            user_data_dir: default_user_data_dir(),
            goals_file: default_goals_file(),
            default_model: default_model(),
            provider_url: default_provider_url(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            json_logs: false,
            verify_model: false,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from an optional config file and the environment.
    ///
    /// A config path that does not exist yet is created with the defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match config_path {
            Some(path) => Self::load_or_create(path)?,
            None => Self::default(),
        };

        dotenv::dotenv().ok();
        config.apply_overrides(|key| env::var(key).ok());

        info!(
            goals_path = %config.goals_path().display(),
            model = %config.default_model,
            provider_url = %config.provider_url,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reads `path`, or writes the defaults there when it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| {
                CoreError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            return serde_json::from_str(&text).map_err(|e| {
                CoreError::Config(format!("Invalid config file {}: {}", path.display(), e))
            });
        }

        let config = Self::default();
        config.write_to(path)?;
        info!(path = %path.display(), "Wrote default configuration");
        Ok(config)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, text)
            .map_err(|e| CoreError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Applies `GOALPLAN_*` overrides. Unparseable values are logged and skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("GOALPLAN_USER_DATA_DIR") {
            self.user_data_dir = PathBuf::from(dir);
        }

        if let Some(file) = lookup("GOALPLAN_GOALS_FILE") {
            self.goals_file = file;
        }

        if let Some(model) = lookup("GOALPLAN_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = lookup("GOALPLAN_PROVIDER_URL") {
            self.provider_url = url;
        }

        if let Some(timeout) = lookup("GOALPLAN_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!("Invalid GOALPLAN_REQUEST_TIMEOUT_SECS value: {}", timeout),
            }
        }

        if let Some(level) = lookup("GOALPLAN_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(json) = lookup("GOALPLAN_JSON_LOGS") {
            match parse_flag(&json) {
                Some(flag) => self.json_logs = flag,
                None => warn!("Invalid GOALPLAN_JSON_LOGS value: {}", json),
            }
        }

        if let Some(verify) = lookup("GOALPLAN_VERIFY_MODEL") {
            match parse_flag(&verify) {
                Some(flag) => self.verify_model = flag,
                None => warn!("Invalid GOALPLAN_VERIFY_MODEL value: {}", verify),
            }
        }
    }

    /// Full path of the persisted goal graph.
    pub fn goals_path(&self) -> PathBuf {
        self.user_data_dir.join(&self.goals_file)
    }

    pub fn provider_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.provider_url.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            default_model: self.default_model.clone(),
            verify_model: self.verify_model,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
