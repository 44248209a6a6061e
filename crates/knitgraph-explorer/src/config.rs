//! Runtime configuration
//!
//! Loaded from an optional TOML file, then overridden from the
//! environment (a `.env` file is honoured).

use knitgraph_core::AnalysisOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "knitgraph.toml";

pub const ENV_PROVIDER_URL: &str = "KNITGRAPH_PROVIDER_URL";
pub const ENV_FETCH_TIMEOUT_MS: &str = "KNITGRAPH_FETCH_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Http,
    Static,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "http" => Ok(ProviderKind::Http),
            "static" => Ok(ProviderKind::Static),
            other => Err(ConfigError::Invalid(format!(
                "unknown provider kind: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    /// JSON catalog served by the static provider.
    pub catalog: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            kind: ProviderKind::Http,
            base_url: "http://127.0.0.1:8080".to_string(),
            catalog: None,
            timeout_ms: 10_000,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Limits for recursive exploration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Deepest level that is still fetched.
    pub max_depth: usize,
    /// Child classes are only looked up below this depth.
    pub child_depth: usize,
    /// Concurrent provider fetches per crawl.
    pub concurrency: usize,
    /// Parent name that never becomes an `extends` edge.
    pub root_sentinel: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            max_depth: 5,
            child_depth: 3,
            concurrency: 8,
            root_sentinel: "java/lang/Object".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnitConfig {
    pub provider: ProviderConfig,
    pub explorer: ExplorerConfig,
    pub analysis: AnalysisOptions,
    pub server: ServerSettings,
}

impl KnitConfig {
    /// Load from `path`, or from `knitgraph.toml` when present, then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file, using defaults");
                KnitConfig::default()
            }
        };

        let config = config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `KNITGRAPH_*` overrides read through `lookup`.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_PROVIDER_URL) {
            self.provider.base_url = url;
            debug!("Override provider URL from environment");
        }
        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => {
                    self.provider.timeout_ms = ms;
                    debug!("Override fetch timeout from environment");
                }
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", ENV_FETCH_TIMEOUT_MS, raw),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.explorer.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "explorer.concurrency must be at least 1".into(),
            ));
        }
        if self.provider.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_ms must be positive".into(),
            ));
        }
        if self.provider.kind == ProviderKind::Static && self.provider.catalog.is_none() {
            return Err(ConfigError::Invalid(
                "provider.catalog is required for the static provider".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KnitConfig::default();
        assert_eq!(config.explorer.max_depth, 5);
        assert_eq!(config.explorer.child_depth, 3);
        assert_eq!(config.explorer.concurrency, 8);
        assert_eq!(config.explorer.root_sentinel, "java/lang/Object");
        assert_eq!(config.analysis.root_id, "AppModule");
        assert_eq!(config.analysis.dependency_threshold, 5);
        assert_eq!(config.server.port, 7890);
        assert_eq!(config.provider.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = KnitConfig::from_toml_str(
            r#"
            [provider]
            kind = "static"
            catalog = "classes.json"

            [explorer]
            max_depth = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Static);
        assert_eq!(config.provider.catalog, Some(PathBuf::from("classes.json")));
        assert_eq!(config.explorer.max_depth, 2);
        assert_eq!(config.explorer.child_depth, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = KnitConfig::default().apply_overrides(|key| match key {
            ENV_PROVIDER_URL => Some("http://metadata:9000".to_string()),
            ENV_FETCH_TIMEOUT_MS => Some("250".to_string()),
            _ => None,
        });
        assert_eq!(config.provider.base_url, "http://metadata:9000");
        assert_eq!(config.provider.timeout_ms, 250);

        let unchanged = KnitConfig::default()
            .apply_overrides(|key| (key == ENV_FETCH_TIMEOUT_MS).then(|| "soon".to_string()));
        assert_eq!(unchanged.provider.timeout_ms, 10_000);
    }

    #[test]
    fn test_static_provider_requires_catalog() {
        let mut config = KnitConfig::default();
        config.provider.kind = ProviderKind::Static;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();

        let config = KnitConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(KnitConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
