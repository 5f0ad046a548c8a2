//! Language-model and embedding provider implementations for ragloop.
//!
//! All providers implement the `ragloop_core::Provider` trait.
//! The factory builds the chat and embedding providers from configuration.

pub mod factory;
pub mod openai_compat;

pub use factory::{build_chat_provider, build_embedding_provider};
pub use openai_compat::OpenAiCompatProvider;
