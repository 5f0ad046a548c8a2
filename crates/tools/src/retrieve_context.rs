//! Document retrieval tool — the agent's window onto the vector collection.
//!
//! The model passes a free-text query; the tool returns the matching chunks'
//! text separated by blank lines.

use async_trait::async_trait;
use ragloop_core::error::ToolError;
use ragloop_core::retrieval::Retriever;
use ragloop_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::debug;

use crate::RETRIEVE_CONTEXT;

/// Output when the collection has nothing for the query.
pub const NO_CONTEXT: &str = "No relevant context found.";

pub struct RetrieveContextTool {
    retriever: Arc<dyn Retriever>,
}

impl RetrieveContextTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RetrieveContextTool {
    fn name(&self) -> &str {
        RETRIEVE_CONTEXT
    }

    fn description(&self) -> &str {
        "Search and return information about businesses in Nigeria."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant context"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let documents =
            self.retriever
                .retrieve(query)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: RETRIEVE_CONTEXT.into(),
                    reason: e.to_string(),
                })?;

        debug!(
            retriever = %self.retriever.name(),
            hits = documents.len(),
            "retrieve_context finished"
        );

        let output = if documents.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            documents
                .iter()
                .map(|d| d.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        Ok(ToolResult {
            call_id: String::new(),
            output,
        })
    }
}
