//! Retriever trait — the abstraction over document retrieval.
//!
//! A Retriever turns a free-text query into the most relevant document
//! chunks from a pre-populated collection. How it ranks them (embeddings,
//! keyword search, a remote service) is its own business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// One retrieved chunk of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The chunk text
    pub content: String,

    /// Source metadata stored alongside the chunk
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Similarity to the query (higher is closer)
    #[serde(default)]
    pub score: f32,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: serde_json::Map::new(),
            score: 0.0,
        }
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// A short name for logs (e.g., "qdrant:vit-rag").
    fn name(&self) -> &str;

    /// Return the documents most relevant to `query`, best first.
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError>;
}
