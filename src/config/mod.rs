//! Router configuration: worker list, default worker, decision model, keys.
//!
//! Loaded once at startup from a TOML file, then overridden from the
//! environment. Immutable after [`RouterConfig::validate`] succeeds.

use std::collections::HashSet;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default number of failed calls before a key is skipped.
pub const DEFAULT_MAX_KEY_FAILURES: u32 = 3;

const BASE_URL_ENV_VAR: &str = "ROUTEWISE_BASE_URL";
const API_KEYS_ENV_VAR: &str = "ROUTEWISE_API_KEYS";
const DECISION_MODEL_ENV_VAR: &str = "ROUTEWISE_DECISION_MODEL";
const DEFAULT_WORKER_ENV_VAR: &str = "ROUTEWISE_DEFAULT_WORKER";

/// A worker model the router may choose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    pub name: String,
    pub description: String,
}

impl WorkerDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Model used for the decision call.
    pub decision_model: String,
    /// Worker returned whenever routing cannot be trusted.
    pub default_worker: String,
    /// Eligible workers, in prompt order.
    pub workers: Vec<WorkerDescriptor>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default = "default_max_key_failures")]
    pub max_key_failures: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_key_failures() -> u32 {
    DEFAULT_MAX_KEY_FAILURES
}

impl RouterConfig {
    pub fn new(
        decision_model: impl Into<String>,
        default_worker: impl Into<String>,
        workers: Vec<WorkerDescriptor>,
    ) -> Self {
        Self {
            decision_model: decision_model.into(),
            default_worker: default_worker.into(),
            workers,
            base_url: default_base_url(),
            api_keys: Vec::new(),
            max_key_failures: DEFAULT_MAX_KEY_FAILURES,
        }
    }

    /// Parse a TOML document. Does not apply env overrides or validate.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(ConfigError::ParseFailed)
    }

    /// Load from a TOML file, apply environment overrides, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `ROUTEWISE_*` environment variables.
    ///
    /// Empty values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = read_env(BASE_URL_ENV_VAR) {
            self.base_url = url;
        }
        if let Some(model) = read_env(DECISION_MODEL_ENV_VAR) {
            self.decision_model = model;
        }
        if let Some(worker) = read_env(DEFAULT_WORKER_ENV_VAR) {
            self.default_worker = worker;
        }
        if let Some(keys) = read_env(API_KEYS_ENV_VAR) {
            let parsed: Vec<String> = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
            if parsed.is_empty() {
                warn!("{} contains no usable keys, keeping configured keys", API_KEYS_ENV_VAR);
            } else {
                self.api_keys = parsed;
            }
        }
    }

    /// Check the invariants the router relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_model.trim().is_empty() {
            return Err(ConfigError::EmptyDecisionModel);
        }
        if self.default_worker.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultWorker);
        }
        if self.workers.is_empty() {
            return Err(ConfigError::NoWorkers);
        }

        let mut seen = HashSet::new();
        for (idx, worker) in self.workers.iter().enumerate() {
            if worker.name.trim().is_empty() {
                return Err(ConfigError::EmptyWorkerName(idx));
            }
            if !seen.insert(worker.name.as_str()) {
                return Err(ConfigError::DuplicateWorker(worker.name.clone()));
            }
        }

        if !self.is_worker(&self.default_worker) {
            warn!(
                "Default worker '{}' is not in the worker list; it will still be used as fallback",
                self.default_worker
            );
        }

        Ok(())
    }

    /// Exact, case-sensitive membership test against the worker names.
    pub fn is_worker(&self, name: &str) -> bool {
        self.workers.iter().any(|w| w.name == name)
    }

    pub fn worker_names(&self) -> impl Iterator<Item = &str> {
        self.workers.iter().map(|w| w.name.as_str())
    }
}

fn read_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        Ok(_) => {
            warn!("{} is set but empty, ignoring", name);
            None
        }
        Err(_) => None,
    }
}
