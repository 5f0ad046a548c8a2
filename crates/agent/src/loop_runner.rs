//! The conversation loop implementation.

use futures::future::try_join_all;
use ragloop_core::error::{ProviderError, ToolError};
use ragloop_core::message::{Conversation, Message, MessageToolCall};
use ragloop_core::provider::{Provider, ProviderRequest, ProviderResponse};
use ragloop_core::tool::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reply appended when the model keeps asking for tools past the cap.
pub const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without requesting tools.
    FinalReply,
    /// The iteration cap was hit; the reply is [`MAX_ITERATIONS_REPLY`].
    MaxIterations,
}

/// Result of one loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Content of the final assistant message (may be empty).
    pub reply: String,
    /// Model calls made.
    pub iterations: u32,
    /// Tool calls executed across all rounds.
    pub tool_calls_made: usize,
    pub stop_reason: StopReason,
}

/// Orchestrates model calls and tool execution for one conversation.
///
/// Holds no per-request state; one instance serves every request.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Prepended to every model request, never stored in the conversation
    system_prompt: String,

    /// Maximum model calls per run
    max_iterations: u32,

    /// Per model/tool call limit
    call_timeout: Option<Duration>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            system_prompt: system_prompt.into(),
            max_iterations: 10,
            call_timeout: None,
        }
    }

    /// Set the maximum number of model calls per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Bound every model call and every tool call; `None` waits forever.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Drive the conversation until the model replies without tool calls.
    ///
    /// Appends every model message and tool result to `conversation`; on
    /// success the last message is always a tool-call-free assistant
    /// message. Any model or tool failure aborts the run.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
    ) -> Result<LoopOutcome, ragloop_core::Error> {
        info!(
            messages = conversation.len(),
            model = %self.model,
            "Running conversation loop"
        );

        let tool_definitions = self.tools.definitions();
        let mut iterations = 0u32;
        let mut tool_calls_made = 0usize;

        loop {
            if iterations >= self.max_iterations {
                warn!(
                    iterations,
                    tool_calls = tool_calls_made,
                    "Max tool iterations reached, forcing text response"
                );
                conversation.push(Message::assistant(MAX_ITERATIONS_REPLY));
                return Ok(LoopOutcome {
                    reply: MAX_ITERATIONS_REPLY.into(),
                    iterations,
                    tool_calls_made,
                    stop_reason: StopReason::MaxIterations,
                });
            }

            iterations += 1;
            debug!(iteration = iterations, "Loop iteration");

            let mut messages = Vec::with_capacity(conversation.len() + 1);
            messages.push(Message::system(&self.system_prompt));
            messages.extend_from_slice(conversation.messages());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.call_model(request).await?;
            if let Some(usage) = &response.usage {
                debug!(
                    model = %response.model,
                    total_tokens = usage.total_tokens,
                    "Model responded"
                );
            }

            let message = response.message;
            if !message.has_tool_calls() {
                let reply = message.content.clone();
                conversation.push(message);

                info!(
                    iterations,
                    tool_calls = tool_calls_made,
                    messages = conversation.len(),
                    "Conversation loop finished"
                );
                return Ok(LoopOutcome {
                    reply,
                    iterations,
                    tool_calls_made,
                    stop_reason: StopReason::FinalReply,
                });
            }

            let tool_calls = message.tool_calls.clone();
            conversation.push(message);

            debug!(tool_count = tool_calls.len(), "Executing tool calls");

            // Results come back in call order regardless of completion order
            let results = try_join_all(tool_calls.iter().map(|tc| self.run_tool(tc))).await?;
            tool_calls_made += tool_calls.len();

            for (tc, result) in tool_calls.iter().zip(results) {
                conversation.push(Message::tool_result(&tc.id, result.output));
            }
        }
    }

    async fn call_model(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.complete(request))
                .await
                .map_err(|_| {
                    warn!(provider = %self.provider.name(), "Model call timed out");
                    ProviderError::Timeout(format!(
                        "{} did not respond within {:?}",
                        self.provider.name(),
                        limit
                    ))
                })?,
            None => self.provider.complete(request).await,
        }
    }

    async fn run_tool(&self, tc: &MessageToolCall) -> Result<ToolResult, ToolError> {
        let call = tc.to_tool_call()?;
        debug!(tool = %call.name, call_id = %call.id, "Executing tool call");

        let result = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.tools.execute(&call))
                .await
                .map_err(|_| ToolError::Timeout {
                    tool_name: call.name.clone(),
                    timeout: limit,
                })?,
            None => self.tools.execute(&call).await,
        };

        if let Err(e) = &result {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
        }
        result
    }
}
