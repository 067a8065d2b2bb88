//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hazardwatch.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".hazardwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Completion service settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Hosted store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL of the hosted database.
    #[serde(default)]
    pub url: String,

    /// API key sent with every query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_sightings_table")]
    pub sightings_table: String,

    #[serde(default = "default_hazards_table")]
    pub hazards_table: String,

    #[serde(default = "default_tasks_table")]
    pub tasks_table: String,

    /// Per-query timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_seconds: u64,

    /// Rows requested per page. Hosted PostgREST caps responses at 1000 rows.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            sightings_table: default_sightings_table(),
            hazards_table: default_hazards_table(),
            tasks_table: default_tasks_table(),
            timeout_seconds: default_store_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_sightings_table() -> String {
    "wildlife_sightings".to_string()
}

fn default_hazards_table() -> String {
    "hazard_reports".to_string()
}

fn default_tasks_table() -> String {
    "tasks".to_string()
}

fn default_store_timeout() -> u64 {
    15
}

fn default_page_size() -> usize {
    1000
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name sent with each request.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the chat completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. When absent the deterministic summary is always used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_timeout() -> u64 {
    60
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 30-day sighting count above which the summary reports increased activity.
    #[serde(default = "default_increase_threshold")]
    pub increase_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            increase_threshold: default_increase_threshold(),
        }
    }
}

fn default_increase_threshold() -> usize {
    20
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// config file settings, but only when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.store_url {
            self.store.url = url.clone();
        }
        if let Some(ref key) = args.store_key {
            self.store.api_key = Some(key.clone());
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref base_url) = args.api_base {
            self.model.base_url = base_url.clone();
        }
        if let Some(ref key) = args.api_key {
            self.model.api_key = Some(key.clone());
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // --offline always wins over any configured key
        if args.offline {
            self.model.api_key = None;
        }

        if let Some(threshold) = args.threshold {
            self.analysis.increase_threshold = threshold;
        }

        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 1500);
        assert_eq!(config.analysis.increase_threshold, 20);
        assert_eq!(config.store.sightings_table, "wildlife_sightings");
        assert_eq!(config.store.page_size, 1000);
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[store]
url = "https://example.supabase.co"
api_key = "anon"

[model]
name = "gpt-4o"
temperature = 0.2

[analysis]
increase_threshold = 35
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.store.url, "https://example.supabase.co");
        assert_eq!(config.store.api_key.as_deref(), Some("anon"));
        assert_eq!(config.store.tasks_table, "tasks");
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.max_tokens, 1500);
        assert_eq!(config.analysis.increase_threshold, 35);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"0.0.0.0:9000\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[model\nname = ").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[server]"));
        assert!(!toml_str.contains("api_key"));
    }
}
