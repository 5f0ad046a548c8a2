//! Embed-then-search retriever.

use async_trait::async_trait;
use ragloop_core::error::RetrievalError;
use ragloop_core::provider::{EmbeddingRequest, Provider};
use ragloop_core::retrieval::{Document, Retriever};
use std::sync::Arc;
use tracing::debug;

use crate::VectorStore;

/// Embeds the query with `embedder` and returns the store's top `k` matches.
pub struct VectorRetriever {
    name: String,
    embedder: Arc<dyn Provider>,
    model: String,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(
        embedder: Arc<dyn Provider>,
        model: impl Into<String>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            name: format!("vector:{}", store.name()),
            embedder,
            model: model.into(),
            store,
            top_k,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let embedding = response
            .embeddings
            .into_iter()
            .next()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| RetrievalError::Embedding("embedding service returned no vector".into()))?;

        let documents = self.store.search(&embedding, self.top_k).await?;
        debug!(retriever = %self.name, query, hits = documents.len(), "Retrieved documents");
        Ok(documents)
    }
}
