//! Tool implementations for ragloop.
//!
//! The agent exposes a fixed set of tools to the model. Today that set is a
//! single document retrieval tool; the registry is still checked for
//! completeness at start-up so a misconfigured build fails before serving.

pub mod retrieve_context;

use std::sync::Arc;

use ragloop_core::error::ToolError;
use ragloop_core::retrieval::Retriever;
use ragloop_core::tool::ToolRegistry;

pub use retrieve_context::RetrieveContextTool;

/// Name of the document retrieval tool as the model sees it.
pub const RETRIEVE_CONTEXT: &str = "retrieve_context";

/// Tools every registry handed to the agent must contain.
pub const REQUIRED_TOOLS: &[&str] = &[RETRIEVE_CONTEXT];

/// Create the tool registry backed by `retriever`.
pub fn default_registry(retriever: Arc<dyn Retriever>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RetrieveContextTool::new(retriever)));
    registry.ensure_registered(REQUIRED_TOOLS)?;
    Ok(registry)
}
