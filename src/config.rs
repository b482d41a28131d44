use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub frontkg: FrontkgConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Process-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FrontkgConfig {
    /// CSV file with `source,target,relation,weight` rows.
    pub data_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Graph view configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Node count returned by `/api/graph-data` when no `limit` is given
    #[serde(default = "default_graph_limit")]
    pub default_limit: usize,
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_limit: default_graph_limit(),
            recommendation_limit: default_recommendation_limit(),
        }
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_url_env")]
    pub api_url_env: String,
    /// Used when the URL env var is unset
    #[serde(default = "default_api_url")]
    pub default_api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_cache_capacity")]
    pub learning_path_cache_capacity: usize,
    #[serde(default = "default_quick_profile")]
    pub quick: ModeProfile,
    #[serde(default = "default_deep_profile")]
    pub deep: ModeProfile,
    #[serde(default = "default_learning_path_profile")]
    pub learning_path: ModeProfile,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_url_env: default_api_url_env(),
            default_api_url: default_api_url(),
            model: default_model(),
            learning_path_cache_capacity: default_cache_capacity(),
            quick: default_quick_profile(),
            deep: default_deep_profile(),
            learning_path: default_learning_path_profile(),
        }
    }
}

/// Latency/quality budget for one kind of remote call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModeProfile {
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModeProfile {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_graph_limit() -> usize {
    60
}

fn default_recommendation_limit() -> usize {
    5
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_api_url_env() -> String {
    "DEEPSEEK_API_URL".to_string()
}

fn default_api_url() -> String {
    "https://api.deepseek.com/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_cache_capacity() -> usize {
    256
}

fn default_quick_profile() -> ModeProfile {
    ModeProfile {
        timeout_secs: 7,
        temperature: 0.3,
        max_tokens: 512,
    }
}

fn default_deep_profile() -> ModeProfile {
    ModeProfile {
        timeout_secs: 200,
        temperature: 0.7,
        max_tokens: 4096,
    }
}

fn default_learning_path_profile() -> ModeProfile {
    ModeProfile {
        timeout_secs: 60,
        temperature: 0.3,
        max_tokens: 1500,
    }
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in FRONTKG_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("FRONTKG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.frontkg.data_path.is_file() {
            anyhow::bail!(
                "data_path does not point to a file: {}. Set data_path in config.toml to the knowledge CSV.",
                self.frontkg.data_path.display()
            );
        }

        std::env::var(&self.llm.api_key_env)
            .with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable with your chat API key.",
                    self.llm.api_key_env
                )
            })?;

        if self.graph.default_limit == 0 {
            anyhow::bail!("graph.default_limit must be greater than 0");
        }

        for (name, profile) in [
            ("quick", &self.llm.quick),
            ("deep", &self.llm.deep),
            ("learning_path", &self.llm.learning_path),
        ] {
            if profile.timeout_secs == 0 {
                anyhow::bail!("llm.{}.timeout_secs must be greater than 0", name);
            }
            if !(0.0..=2.0).contains(&profile.temperature) {
                anyhow::bail!("llm.{}.temperature must be between 0.0 and 2.0", name);
            }
            if profile.max_tokens == 0 {
                anyhow::bail!("llm.{}.max_tokens must be greater than 0", name);
            }
        }

        Ok(())
    }

    /// Get the knowledge CSV path
    pub fn data_path(&self) -> &Path {
        &self.frontkg.data_path
    }

    /// Chat API key, read from the configured env var
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env)
            .with_context(|| format!("Environment variable {} not set", self.llm.api_key_env))
    }

    /// Chat completion URL: env var if set, otherwise the configured default
    pub fn api_url(&self) -> String {
        std::env::var(&self.llm.api_url_env)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.llm.default_api_url.clone())
    }
}
