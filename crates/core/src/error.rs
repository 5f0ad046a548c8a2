//! Error types for the ragloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external capability has its own error enum.

use std::time::Duration;
use thiserror::Error;

/// The top-level error type for all ragloop operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Language-model errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure came from a call that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Provider(ProviderError::Timeout(_)) | Error::Tool(ToolError::Timeout { .. })
        )
    }

    /// Whether the failure originated in an upstream capability
    /// (model, tool, or vector store) rather than in this process.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Provider(_) | Error::Tool(_) | Error::Retrieval(_)
        )
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Capability errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout:?}")]
    Timeout { tool_name: String, timeout: Duration },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector store request failed: {message} (status: {status_code})")]
    Store { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed vector store response: {0}")]
    MalformedResponse(String),
}
