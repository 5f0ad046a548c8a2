//! Configuration loading, validation, and management for ragloop.
//!
//! Loads configuration from `~/.ragloop/config.toml` (or an explicit path)
//! with environment variable overrides, read from a `.env` file in the
//! working directory and then the process environment. Credentials for the language model
//! and the vector store are resolved once at startup; a missing one stops
//! the process before it serves a single request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the language-model provider credential.
pub const ENV_LLM_API_KEY: &str = "GOOGLE_API_KEY";
/// Environment variable holding the vector-store endpoint URL.
pub const ENV_VECTOR_STORE_URL: &str = "QDRANT_URL";
/// Environment variable holding the vector-store access key.
pub const ENV_VECTOR_STORE_API_KEY: &str = "QDRANT_API";
/// Environment variable pointing at an explicit config file.
pub const ENV_CONFIG_PATH: &str = "RAGLOOP_CONFIG";
/// Environment file read from the working directory.
pub const ENV_FILE: &str = ".env";

/// The root configuration structure.
///
/// Maps directly to `~/.ragloop/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Query embedding settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector store settings
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Conversation loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP surface settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider label used in logs
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_llm_provider() -> String {
    "gemini".into()
}
fn default_llm_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_llm_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_url: default_llm_api_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible base URL serving `/embeddings`
    #[serde(default = "default_embedding_api_url")]
    pub api_url: String,

    /// Optional; local embedding servers usually need none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Must match the model the collection was indexed with
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_api_url() -> String {
    "http://localhost:7997/v1".into()
}
fn default_embedding_model() -> String {
    "jinaai/jina-embeddings-v2-small-en".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_embedding_api_url(),
            api_key: None,
            model: default_embedding_model(),
        }
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of chunks returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Payload field holding the chunk text
    #[serde(default = "default_content_key")]
    pub content_payload_key: String,

    /// Payload field holding the chunk metadata
    #[serde(default = "default_metadata_key")]
    pub metadata_payload_key: String,

    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_collection() -> String {
    "vit-rag".into()
}
fn default_top_k() -> usize {
    4
}
fn default_content_key() -> String {
    "page_content".into()
}
fn default_metadata_key() -> String {
    "metadata".into()
}
fn default_store_timeout() -> u64 {
    30
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            collection: default_collection(),
            top_k: default_top_k(),
            content_payload_key: default_content_key(),
            metadata_payload_key: default_metadata_key(),
            timeout_secs: default_store_timeout(),
        }
    }
}

impl std::fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("collection", &self.collection)
            .field("top_k", &self.top_k)
            .field("content_payload_key", &self.content_payload_key)
            .field("metadata_payload_key", &self.metadata_payload_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per request (safety limit)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Per model/tool call timeout; 0 disables it
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Replace the built-in system prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Completed exchanges echoed back to the caller
    #[serde(default = "default_history_pairs")]
    pub history_pairs: usize,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_call_timeout() -> u64 {
    60
}
fn default_history_pairs() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            call_timeout_secs: default_call_timeout(),
            system_prompt_override: None,
            history_pairs: default_history_pairs(),
        }
    }
}

/// Shape of the `POST /chat` response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// `{"messages": [...], "response": "..."}`: trimmed history plus reply
    #[default]
    History,
    /// `{"message": {"role": "assistant", "content": "..."}}`
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub response_shape: ResponseShape,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            response_shape: ResponseShape::default(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Secrets and endpoints that must be present before the service starts.
#[derive(Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub vector_store_url: String,
    pub vector_store_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"[REDACTED]")
            .field("vector_store_url", &self.vector_store_url)
            .field("vector_store_api_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `path`, `$RAGLOOP_CONFIG`, or the default
    /// location, then apply environment overrides and validate.
    ///
    /// Environment variables (highest priority, then `.env`):
    /// - `GOOGLE_API_KEY`, `QDRANT_URL`, `QDRANT_API`
    /// - `RAGLOOP_MODEL`, `RAGLOOP_EMBEDDING_URL`, `RAGLOOP_HOST`, `RAGLOOP_PORT`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(ENV_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::config_dir().join("config.toml")),
        };

        let mut config = Self::read_file(&path)?;
        config.apply_env_file(Path::new(ENV_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_VECTOR_STORE_URL) {
            self.vector_store.url = Some(url);
        }
        if let Some(key) = lookup(ENV_VECTOR_STORE_API_KEY) {
            self.vector_store.api_key = Some(key);
        }
        if let Some(model) = lookup("RAGLOOP_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("RAGLOOP_EMBEDDING_URL") {
            self.embedding.api_url = url;
        }
        if let Some(host) = lookup("RAGLOOP_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = lookup("RAGLOOP_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("RAGLOOP_PORT is not a valid port: {port}"))
            })?;
        }
        Ok(())
    }

    /// Apply overrides from a dotenv file. A missing file is not an error.
    pub fn apply_env_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Ok(());
        }

        let vars: HashMap<String, String> = dotenvy::from_path_iter(path)
            .and_then(|iter| iter.collect())
            .map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::info!(path = %path.display(), vars = vars.len(), "Loaded environment file");
        self.apply_env(|key| vars.get(key).cloned())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragloop")
    }

    /// Validate value ranges. Credentials are checked by [`AppConfig::credentials`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.agent.history_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.history_pairs must be at least 1".into(),
            ));
        }

        if self.vector_store.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "vector_store.top_k must be at least 1".into(),
            ));
        }

        if self.vector_store.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "vector_store.collection must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Resolve required credentials, naming every one that is missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
        }

        let llm_api_key = present(&self.llm.api_key);
        let vector_store_url = present(&self.vector_store.url);
        let vector_store_api_key = present(&self.vector_store.api_key);

        match (llm_api_key, vector_store_url, vector_store_api_key) {
            (Some(llm_api_key), Some(vector_store_url), Some(vector_store_api_key)) => {
                Ok(Credentials {
                    llm_api_key,
                    vector_store_url,
                    vector_store_api_key,
                })
            }
            (llm, url, key) => {
                let mut missing = Vec::new();
                if llm.is_none() {
                    missing.push(ENV_LLM_API_KEY.to_string());
                }
                if url.is_none() {
                    missing.push(ENV_VECTOR_STORE_URL.to_string());
                }
                if key.is_none() {
                    missing.push(ENV_VECTOR_STORE_API_KEY.to_string());
                }
                Err(ConfigError::MissingCredentials(missing))
            }
        }
    }

    /// Effective per-call timeout, `None` when disabled.
    pub fn call_timeout(&self) -> Option<std::time::Duration> {
        (self.agent.call_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.agent.call_timeout_secs))
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required settings: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),
}
