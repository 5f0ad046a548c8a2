//! # ragloop Core
//!
//! Domain types, capability traits, and error definitions for the ragloop
//! chat backend. This crate has **no framework dependencies**: it defines the
//! model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external capability (language model, retriever, tool) is a trait here.
//! Implementations live in their own crates, which keeps:
//! - implementations swappable via configuration
//! - tests free to use scripted stand-ins
//! - the dependency graph pointing inward at core

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{Document, Retriever};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
