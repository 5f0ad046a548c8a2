//! Provider factory — builds the chat and embedding providers from config.
//!
//! Both are created once at startup and shared behind `Arc`.

use std::sync::Arc;

use ragloop_config::{AppConfig, Credentials};
use ragloop_core::error::ProviderError;
use ragloop_core::provider::Provider;
use tracing::info;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the chat-completion provider.
pub fn build_chat_provider(
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn Provider>, ProviderError> {
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        "Chat provider configured"
    );

    let provider = OpenAiCompatProvider::new(
        &config.llm.provider,
        &config.llm.api_url,
        Some(credentials.llm_api_key.clone()),
    )?;
    Ok(Arc::new(provider))
}

/// Build the provider used to embed retrieval queries.
pub fn build_embedding_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    info!(
        url = %config.embedding.api_url,
        model = %config.embedding.model,
        "Embedding provider configured"
    );

    let provider = OpenAiCompatProvider::new(
        "embedding",
        &config.embedding.api_url,
        config.embedding.api_key.clone(),
    )?;
    Ok(Arc::new(provider))
}
