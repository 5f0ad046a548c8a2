//! Qdrant REST vector store.
//!
//! Talks to an existing collection over HTTP:
//! - `POST /collections/{name}/points/search` for nearest-neighbour queries
//! - `GET /collections/{name}` to confirm the collection exists
//!
//! Chunk text and metadata live in the point payload under configurable keys
//! (`page_content` and `metadata` by default).

use async_trait::async_trait;
use ragloop_config::{Credentials, VectorStoreConfig};
use ragloop_core::error::RetrievalError;
use ragloop_core::retrieval::Document;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::VectorStore;

pub struct QdrantStore {
    name: String,
    base_url: String,
    api_key: String,
    collection: String,
    content_key: String,
    metadata_key: String,
    client: reqwest::Client,
}

impl QdrantStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Network(format!("failed to create HTTP client: {e}")))?;
        let collection = collection.into();

        Ok(Self {
            name: format!("qdrant:{collection}"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            collection,
            content_key: "page_content".into(),
            metadata_key: "metadata".into(),
            client,
        })
    }

    /// Build from the vector store section and resolved credentials.
    pub fn from_config(
        config: &VectorStoreConfig,
        credentials: &Credentials,
    ) -> Result<Self, RetrievalError> {
        Ok(Self::new(
            &credentials.vector_store_url,
            &credentials.vector_store_api_key,
            &config.collection,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_payload_keys(&config.content_payload_key, &config.metadata_payload_key))
    }

    /// Override the payload fields holding chunk text and metadata.
    pub fn with_payload_keys(
        mut self,
        content_key: impl Into<String>,
        metadata_key: impl Into<String>,
    ) -> Self {
        self.content_key = content_key.into();
        self.metadata_key = metadata_key.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Turn a search response body into documents, best first.
    fn parse_search_response(&self, body: SearchResponse) -> Result<Vec<Document>, RetrievalError> {
        body.result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload.unwrap_or_default();

                let content = match payload.remove(&self.content_key) {
                    Some(serde_json::Value::String(text)) => text,
                    _ => {
                        return Err(RetrievalError::MalformedResponse(format!(
                            "point {} has no string payload field '{}'",
                            point.id, self.content_key
                        )));
                    }
                };

                let metadata = match payload.remove(&self.metadata_key) {
                    Some(serde_json::Value::Object(map)) => map,
                    _ => serde_json::Map::new(),
                };

                Ok(Document {
                    content,
                    metadata,
                    score: point.score,
                })
            })
            .collect()
    }

    async fn error_from(&self, response: reqwest::Response) -> RetrievalError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        if status == 404 {
            return RetrievalError::CollectionNotFound(self.collection.clone());
        }
        warn!(store = %self.name, status, body = %message, "Vector store returned error");
        RetrievalError::Store {
            status_code: status,
            message,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Document>, RetrievalError> {
        let url = format!("{}/points/search", self.collection_url());
        let body = serde_json::json!({
            "vector": embedding,
            "limit": limit,
            "with_payload": true,
        });

        debug!(store = %self.name, dims = embedding.len(), limit, "Searching collection");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;

        self.parse_search_response(parsed)
    }

    async fn collection_exists(&self) -> Result<bool, RetrievalError> {
        let response = self
            .client
            .get(self.collection_url())
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        match response.status().as_u16() {
            200..=299 => Ok(true),
            404 => Ok(false),
            _ => Err(self.error_from(response).await),
        }
    }
}

// --- Qdrant API types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> QdrantStore {
        QdrantStore::new(
            "http://localhost:6333/",
            "q-key",
            "vit-rag",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn urls_are_built_from_collection() {
        let store = store();
        assert_eq!(store.name(), "qdrant:vit-rag");
        assert_eq!(
            store.collection_url(),
            "http://localhost:6333/collections/vit-rag"
        );
    }

    #[test]
    fn from_config_uses_credentials_and_keys() {
        let config = VectorStoreConfig {
            collection: "company-docs".into(),
            content_payload_key: "text".into(),
            ..Default::default()
        };
        let credentials = Credentials {
            llm_api_key: "g".into(),
            vector_store_url: "https://qdrant.example".into(),
            vector_store_api_key: "q".into(),
        };
        let store = QdrantStore::from_config(&config, &credentials).unwrap();
        assert_eq!(store.collection(), "company-docs");
        assert_eq!(store.content_key, "text");
        assert_eq!(store.metadata_key, "metadata");
        assert_eq!(store.base_url, "https://qdrant.example");
    }

    #[test]
    fn parse_search_response_reads_payload() {
        let data = r#"{
            "result": [
                {
                    "id": 42,
                    "version": 1,
                    "score": 0.91,
                    "payload": {
                        "page_content": "CAC registration costs vary by share capital.",
                        "metadata": {"source": "cac-guide.pdf", "page": 3}
                    }
                },
                {
                    "id": "b7c3a0f2-1d2e-4c55-9a11-0d6c2b7e9f10",
                    "score": 0.77,
                    "payload": {"page_content": "Annual returns are due yearly."}
                }
            ],
            "status": "ok",
            "time": 0.002
        }"#;
        let body: SearchResponse = serde_json::from_str(data).unwrap();
        let docs = store().parse_search_response(body).unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs[0].content.starts_with("CAC registration"));
        assert_eq!(docs[0].metadata["source"], "cac-guide.pdf");
        assert!((docs[0].score - 0.91).abs() < 1e-6);
        assert!(docs[1].metadata.is_empty());
    }

    #[test]
    fn custom_payload_keys() {
        let data = r#"{"result":[{"id":1,"score":0.5,"payload":{"text":"hello","meta":{"k":"v"}}}]}"#;
        let body: SearchResponse = serde_json::from_str(data).unwrap();
        let docs = store()
            .with_payload_keys("text", "meta")
            .parse_search_response(body)
            .unwrap();
        assert_eq!(docs[0].content, "hello");
        assert_eq!(docs[0].metadata["k"], "v");
    }

    #[test]
    fn missing_content_is_malformed() {
        let data = r#"{"result":[{"id":7,"score":0.5,"payload":{"metadata":{}}}]}"#;
        let body: SearchResponse = serde_json::from_str(data).unwrap();
        let err = store().parse_search_response(body).unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedResponse(msg) if msg.contains("page_content")));
    }

    #[test]
    fn empty_result_is_empty() {
        let body: SearchResponse = serde_json::from_str(r#"{"result":[],"status":"ok"}"#).unwrap();
        assert!(store().parse_search_response(body).unwrap().is_empty());
    }
}
