//! Message and Conversation domain types.
//!
//! These are the value objects that flow through one chat request:
//! caller history → Conversation → loop engine appends model and tool
//! messages → final assistant reply.

use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tool::ToolCall;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (only ever prepended to a model request)
    System,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a tool result message answering `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }

    /// Whether this message asks for at least one tool invocation.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message, as sent by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

impl MessageToolCall {
    /// Parse the raw argument string into a dispatchable [`ToolCall`].
    ///
    /// An empty argument string is treated as `{}`.
    pub fn to_tool_call(&self) -> Result<ToolCall, ToolError> {
        let arguments = if self.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&self.arguments).map_err(|e| {
                ToolError::InvalidArguments(format!(
                    "arguments for '{}' are not valid JSON: {e}",
                    self.name
                ))
            })?
        };

        Ok(ToolCall {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments,
        })
    }
}

/// An ordered sequence of messages, unique only by position.
///
/// Built fresh per request and only ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with prior turns.
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the conversation, yielding its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, agent!");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_42", "context text");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_42"));
        assert_eq!(msg.content, "context text");
    }

    #[test]
    fn conversation_appends_in_order() {
        let mut conv = Conversation::from_messages(vec![Message::user("first")]);
        conv.push(Message::assistant("second"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].content, "first");
        assert_eq!(conv.last().map(|m| m.role), Some(Role::Assistant));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
        assert!(!json.contains("tool_calls"));
    }

    #[test]
    fn tool_call_arguments_parse() {
        let raw = MessageToolCall {
            id: "call_1".into(),
            name: "retrieve_context".into(),
            arguments: r#"{"query":"company registration fees"}"#.into(),
        };
        let call = raw.to_tool_call().unwrap();
        assert_eq!(call.id, "call_1");
        assert_eq!(call.arguments["query"], "company registration fees");
    }

    #[test]
    fn empty_tool_call_arguments_become_object() {
        let raw = MessageToolCall {
            id: "call_1".into(),
            name: "retrieve_context".into(),
            arguments: String::new(),
        };
        let call = raw.to_tool_call().unwrap();
        assert!(call.arguments.as_object().unwrap().is_empty());
    }

    #[test]
    fn malformed_tool_call_arguments_rejected() {
        let raw = MessageToolCall {
            id: "call_1".into(),
            name: "retrieve_context".into(),
            arguments: "{not json".into(),
        };
        let err = raw.to_tool_call().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
