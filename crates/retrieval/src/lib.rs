//! Document retrieval for ragloop.
//!
//! A [`VectorRetriever`] embeds the query text and asks a [`VectorStore`]
//! for the nearest chunks. The collection is populated out of band; nothing
//! here writes to a remote store.

pub mod in_memory;
pub mod qdrant;
pub mod retriever;
pub mod vector;

use async_trait::async_trait;
use ragloop_core::error::RetrievalError;
use ragloop_core::retrieval::Document;

pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantStore;
pub use retriever::VectorRetriever;
pub use vector::cosine_similarity;

/// A similarity index over embedded document chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Return up to `limit` documents nearest to `embedding`, best first.
    async fn search(&self, embedding: &[f32], limit: usize)
    -> Result<Vec<Document>, RetrievalError>;

    /// Whether the backing collection exists.
    async fn collection_exists(&self) -> Result<bool, RetrievalError>;
}
