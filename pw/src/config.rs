//! Planwright configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local config file name
const LOCAL_CONFIG: &str = "planwright.yml";

/// Default `llm.base-url`, only meaningful for the gemini provider
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Main Planwright configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider and model chain
    pub llm: LlmConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Session cookie settings
    pub auth: AuthConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set and that both
    /// models of the chain are named. Call this early to fail fast.
    pub fn validate(&self) -> Result<()> {
        debug!("Config::validate: called");
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(eyre::eyre!("llm.model must not be empty"));
        }
        if self.llm.fallback_model.trim().is_empty() {
            return Err(eyre::eyre!("llm.fallback-model must not be empty"));
        }
        if self.llm.provider == "openai" && self.llm.base_url.trim_end_matches('/') == GEMINI_BASE_URL {
            return Err(eyre::eyre!(
                "llm.base-url still points at Gemini; set it to an OpenAI-compatible endpoint for provider 'openai'"
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::implicit_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed: a broken config file is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::implicit_paths(),
        };
        paths
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    /// Project-local file first, then the user config directory
    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("planwright").join(LOCAL_CONFIG));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "openai")
    pub provider: String,

    /// Primary model identifier
    pub model: String,

    /// Model tried once when the primary call fails
    #[serde(rename = "fallback-model")]
    pub fallback_model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Models in the order they are tried
    pub fn model_chain(&self) -> Vec<String> {
        vec![self.model.clone(), self.fallback_model.clone()]
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            fallback_model: "gemini-1.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            cors: true,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/planwright on Linux)
        let database_path = dirs::data_dir()
            .map(|d| d.join("planwright"))
            .unwrap_or_else(|| PathBuf::from(".planwright"))
            .join("planwright.db");

        Self { database_path }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the session cookie
    #[serde(rename = "cookie-name")]
    pub cookie_name: String,

    /// Session lifetime in hours
    #[serde(rename = "session-ttl-hours")]
    pub session_ttl_hours: u32,

    /// Mark the cookie `Secure` (HTTPS only)
    #[serde(rename = "secure-cookie")]
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "planwright_session".to_string(),
            session_ttl_hours: 24 * 7,
            secure_cookie: false,
        }
    }
}
