//! The conversation loop — the heart of ragloop.
//!
//! The agent follows a **Model → Tool → Model** cycle:
//!
//! 1. **Receive** the caller's conversation
//! 2. **Send to LLM** with the system prompt and the tool definitions
//! 3. **If tool calls**: run them (document retrieval), append results, loop back to step 2
//! 4. **If text response**: that is the reply
//!
//! The loop continues until the LLM responds with text only (no tool calls)
//! or the max iteration limit is reached. The history echoed back to the
//! caller is bounded by [`history::trim_history`].

pub mod bootstrap;
pub mod history;
pub mod loop_runner;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bootstrap::AgentRuntime;
pub use history::{MAX_HISTORY_PAIRS, trim_history};
pub use loop_runner::{AgentLoop, LoopOutcome, MAX_ITERATIONS_REPLY, StopReason};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
