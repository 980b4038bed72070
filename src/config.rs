//! Layered configuration for the clausefp pipeline.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every section is `#[serde(default)]`)
//! 2. a YAML file, `clausefp.yaml` in the working directory unless a path is given
//! 3. `.env`, loaded through `dotenvy`
//! 4. `CLAUSEFP__SECTION__KEY` environment variables
//! 5. the legacy `OPENAI_API_KEY` and `FAITHFULNESS_THRESHOLD` variables
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! log_level: "info"
//! log_format: "json"
//!
//! store:
//!   backend: "redb"
//!   path: "clausefp.redb"
//!
//! semantic:
//!   mode: "api"
//!   api_url: "https://api.openai.com/v1/embeddings"
//!   api_provider: "openai"
//!   model_name: "text-embedding-3-small"
//!   dimension: 1536
//!
//! index:
//!   dimension: 1536
//!   lists: 100
//!   probes: 10
//!
//! eval:
//!   threshold: 0.85
//!   golden_path: "golden_set.json"
//!
//! tools:
//!   search_k: 5
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use eval::EvalConfig;
use index::{BackendConfig, IndexConfig};
use semantic::{EmbeddingMode, SemanticConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::ToolsConfig;

/// Prefix of layered environment overrides, e.g. `CLAUSEFP__EVAL__THRESHOLD`.
pub const ENV_PREFIX: &str = "CLAUSEFP";
pub const DEFAULT_CONFIG_FILE: &str = "clausefp.yaml";

const LEGACY_API_KEY: &str = "OPENAI_API_KEY";
const LEGACY_THRESHOLD: &str = "FAITHFULNESS_THRESHOLD";

/// Errors that can occur when loading configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("failed to merge configuration sources: {0}")]
    Layered(#[from] config::ConfigError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Top-level configuration for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version.
    pub version: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    pub store: BackendConfig,
    pub semantic: SemanticConfig,
    pub index: IndexConfig,
    pub eval: EvalConfig,
    pub tools: ToolsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            log_level: "info".into(),
            log_format: LogFormat::Text,
            store: BackendConfig::redb("clausefp.redb"),
            semantic: SemanticConfig::default(),
            index: IndexConfig::default(),
            eval: EvalConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load a YAML file on its own, without environment layering.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load every source against the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::load_with_env(path, &vars)
    }

    /// Like [`load`](Self::load) but reads variables from `vars` instead of the process.
    pub fn load_with_env(
        path: Option<&Path>,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigLoadError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        }
        .format(config::FileFormat::Yaml);

        let env: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut cfg: AppConfig = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?
            .try_deserialize()?;

        cfg.apply_legacy_env(vars)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_legacy_env(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigLoadError> {
        if let Some(key) = vars.get(LEGACY_API_KEY).filter(|k| !k.trim().is_empty()) {
            if self.semantic.api_auth_header.is_none() {
                self.semantic.api_auth_header = Some(format!("Bearer {}", key.trim()));
            }
        }
        if let Some(raw) = vars.get(LEGACY_THRESHOLD) {
            self.eval.threshold = raw.trim().parse().map_err(|_| {
                ConfigLoadError::Validation(format!("{LEGACY_THRESHOLD} is not a number: {raw:?}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.index
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("index: {e}")))?;
        self.eval.validate().map_err(ConfigLoadError::Validation)?;
        self.tools.validate().map_err(ConfigLoadError::Validation)?;

        if self.semantic.dimension != self.index.dimension {
            return Err(ConfigLoadError::Validation(format!(
                "semantic.dimension ({}) and index.dimension ({}) must match",
                self.semantic.dimension, self.index.dimension
            )));
        }
        if let BackendConfig::Redb { path } = &self.store {
            if path.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "store.path must be set for the redb backend".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn uses_remote_embeddings(&self) -> bool {
        self.semantic.mode == EmbeddingMode::Api
    }
}
