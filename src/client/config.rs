//! Client configuration
//!
//! Hosts and retries are handed to the transport untouched. The default
//! index seeds the first query state of a client.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

use super::errors::{ElasticError, ElasticResult};

pub const ENV_HOST: &str = "ELASTIC_HOST";
pub const ENV_RETRIES: &str = "ELASTIC_RETRIES";
pub const ENV_DEFAULT_INDEX: &str = "ELASTIC_DEFAULT_INDEX";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Engine endpoints (default `["http://localhost:9200"]`)
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// Transport retry count (default 1)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Index targeted when the caller sets none (default "index")
    #[serde(default = "default_index")]
    pub index: String,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_hosts() -> Vec<String> {
    vec!["http://localhost:9200".to_string()]
}
fn default_retries() -> u32 {
    1
}
fn default_index() -> String {
    "index".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            retries: default_retries(),
            index: default_index(),
            log_level: default_log_level(),
        }
    }
}

impl ElasticConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ElasticResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ElasticError::config(format!("Failed to read config: {}", e)))?;

        let config: ElasticConfig = serde_json::from_str(&content)
            .map_err(|e| ElasticError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Defaults overlaid with `ELASTIC_HOST`, `ELASTIC_RETRIES` and
    /// `ELASTIC_DEFAULT_INDEX`
    pub fn from_env() -> ElasticResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the env keys
    pub fn from_lookup<F>(lookup: F) -> ElasticResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.hosts = host
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(retries) = lookup(ENV_RETRIES) {
            config.retries = retries.trim().parse().map_err(|_| {
                ElasticError::config(format!("Invalid {}: '{}'", ENV_RETRIES, retries))
            })?;
        }
        if let Some(index) = lookup(ENV_DEFAULT_INDEX) {
            config.index = index;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ElasticResult<()> {
        if self.hosts.is_empty() {
            return Err(ElasticError::config("hosts must not be empty"));
        }

        for host in &self.hosts {
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(ElasticError::config(format!(
                    "Invalid host: '{}'. Must start with http:// or https://",
                    host
                )));
            }
        }

        if self.index.trim().is_empty() {
            return Err(ElasticError::config("index must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ElasticResult<Severity> {
        self.log_level.parse().map_err(|_| {
            ElasticError::config(format!("Invalid log_level: '{}'", self.log_level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_config("{}");
        let config = ElasticConfig::load(file.path()).unwrap();
        assert_eq!(config, ElasticConfig::default());
        assert_eq!(config.hosts, vec!["http://localhost:9200"]);
        assert_eq!(config.retries, 1);
        assert_eq!(config.index, "index");
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"{
                "hosts": ["https://search-1:9200", "https://search-2:9200"],
                "retries": 3,
                "index": "products",
                "log_level": "trace"
            }"#,
        );
        let config = ElasticConfig::load(file.path()).unwrap();
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.retries, 3);
        assert_eq!(config.index, "products");
        assert_eq!(config.severity().unwrap(), Severity::Trace);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let file = write_config("{ not json");
        let err = ElasticConfig::load(file.path()).unwrap_err();
        assert_eq!(err.code(), "ELASTIC_CONFIG_ERROR");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ElasticConfig::load(Path::new("/nonexistent/elasticql.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_validate_rejects_bad_hosts() {
        let mut config = ElasticConfig::default();
        config.hosts = vec![];
        assert!(config.validate().is_err());

        config.hosts = vec!["localhost:9200".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_index_and_unknown_level() {
        let mut config = ElasticConfig::default();
        config.index = "  ".into();
        assert!(config.validate().is_err());

        let mut config = ElasticConfig::default();
        config.log_level = "chatty".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_overlays_env() {
        let vars: HashMap<&str, &str> = [
            (ENV_HOST, "http://a:9200, http://b:9200"),
            (ENV_RETRIES, "5"),
            (ENV_DEFAULT_INDEX, "logs"),
        ]
        .into_iter()
        .collect();

        let config =
            ElasticConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.hosts, vec!["http://a:9200", "http://b:9200"]);
        assert_eq!(config.retries, 5);
        assert_eq!(config.index, "logs");
    }

    #[test]
    fn test_from_lookup_rejects_bad_retries() {
        let err = ElasticConfig::from_lookup(|key| {
            (key == ENV_RETRIES).then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains(ENV_RETRIES));
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = ElasticConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ElasticConfig::default());
    }
}
