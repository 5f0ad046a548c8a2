//! In-memory vector store — useful for testing and local demos.

use async_trait::async_trait;
use ragloop_core::error::RetrievalError;
use ragloop_core::retrieval::Document;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::VectorStore;
use crate::vector::cosine_similarity;

struct Entry {
    embedding: Vec<f32>,
    document: Document,
}

/// A brute-force cosine-similarity store held in a Vec.
pub struct InMemoryVectorStore {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a pre-embedded document.
    pub async fn insert(&self, embedding: Vec<f32>, document: Document) {
        self.entries.write().await.push(Entry {
            embedding,
            document,
        });
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Document>, RetrievalError> {
        let entries = self.entries.read().await;

        let mut results: Vec<Document> = entries
            .iter()
            .map(|e| {
                let mut doc = e.document.clone();
                doc.score = cosine_similarity(&e.embedding, embedding);
                doc
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn collection_exists(&self) -> Result<bool, RetrievalError> {
        Ok(true)
    }
}
