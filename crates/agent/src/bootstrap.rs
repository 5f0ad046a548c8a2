//! Runtime bootstrap — builds every long-lived collaborator once.
//!
//! Providers, the vector store, the retriever, the tool registry and the
//! loop engine are created at start-up and shared read-only by all requests.

use std::sync::Arc;

use ragloop_config::{AppConfig, Credentials};
use ragloop_core::error::{Error, RetrievalError};
use ragloop_core::provider::Provider;
use ragloop_retrieval::{QdrantStore, VectorRetriever, VectorStore};
use tracing::info;

use crate::loop_runner::AgentLoop;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Everything a request handler needs, built once.
pub struct AgentRuntime {
    pub agent: Arc<AgentLoop>,
    pub chat_provider: Arc<dyn Provider>,
    pub embedder: Arc<dyn Provider>,
    pub store: Arc<dyn VectorStore>,
}

impl AgentRuntime {
    /// Build the production runtime: Gemini-compatible chat, remote
    /// embeddings, Qdrant store.
    pub fn build(config: &AppConfig, credentials: &Credentials) -> Result<Self, Error> {
        let chat_provider = ragloop_providers::build_chat_provider(config, credentials)?;
        let embedder = ragloop_providers::build_embedding_provider(config)?;
        let store: Arc<dyn VectorStore> =
            Arc::new(QdrantStore::from_config(&config.vector_store, credentials)?);

        Self::from_parts(config, chat_provider, embedder, store)
    }

    /// Assemble a runtime around already-built collaborators.
    pub fn from_parts(
        config: &AppConfig,
        chat_provider: Arc<dyn Provider>,
        embedder: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self, Error> {
        let retriever = Arc::new(VectorRetriever::new(
            embedder.clone(),
            &config.embedding.model,
            store.clone(),
            config.vector_store.top_k,
        ));
        let tools = Arc::new(ragloop_tools::default_registry(retriever)?);

        let system_prompt = config
            .agent
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let mut agent = AgentLoop::new(
            chat_provider.clone(),
            &config.llm.model,
            config.llm.temperature,
            tools,
            system_prompt,
        )
        .with_max_iterations(config.agent.max_iterations)
        .with_call_timeout(config.call_timeout());

        if let Some(max_tokens) = config.llm.max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }

        info!(
            model = %config.llm.model,
            store = %store.name(),
            tools = ?agent.tools().names(),
            max_iterations = config.agent.max_iterations,
            "Agent runtime ready"
        );

        Ok(Self {
            agent: Arc::new(agent),
            chat_provider,
            embedder,
            store,
        })
    }

    /// Fail unless the vector collection already exists.
    pub async fn preflight(&self) -> Result<(), Error> {
        if self.store.collection_exists().await? {
            Ok(())
        } else {
            Err(RetrievalError::CollectionNotFound(self.store.name().to_string()).into())
        }
    }
}
