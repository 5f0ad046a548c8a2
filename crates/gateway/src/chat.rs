//! `POST /chat` — wire types, handler, and error mapping.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ragloop_agent::trim_history;
use ragloop_config::ResponseShape;
use ragloop_core::message::{Conversation, Message, Role};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span};

use crate::SharedState;

/// Reply substituted when the model's final message is empty.
pub const NO_REPLY: &str = "[No assistant reply]";

// ── Wire types ────────────────────────────────────────────────────────────

/// Roles a caller may send. Defaults to `user` when omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    #[default]
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Assistant,
            content: content.into(),
        }
    }

    fn to_message(&self) -> Message {
        match self.role {
            WireRole::User => Message::user(&self.content),
            WireRole::Assistant => Message::assistant(&self.content),
        }
    }

    /// Only caller-visible roles cross the wire.
    fn from_message(message: &Message) -> Option<Self> {
        let role = match message.role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Assistant,
            Role::System | Role::Tool => return None,
        };
        Some(Self {
            role,
            content: message.content.clone(),
        })
    }
}

/// A single message or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: OneOrMany<WireMessage>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    /// Trimmed history ending in the reply, plus the reply text.
    History {
        messages: Vec<WireMessage>,
        response: String,
    },
    /// The reply alone.
    Single { message: WireMessage },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// A failed chat request, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ragloop_core::Error> for ApiError {
    fn from(err: ragloop_core::Error) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else if err.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error!(error = %err, status = status.as_u16(), "Chat request failed");
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ── Handler ───────────────────────────────────────────────────────────────

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    async move {
        let wire = payload.messages.into_vec();
        if wire.is_empty() {
            return Err(ApiError::bad_request("messages must not be empty"));
        }
        info!(messages = wire.len(), "Chat request received");

        let caller: Vec<Message> = wire.iter().map(WireMessage::to_message).collect();
        let mut conversation = Conversation::from_messages(caller.clone());

        let outcome = state.agent.run(&mut conversation).await?;

        let reply = if outcome.reply.is_empty() {
            NO_REPLY.to_string()
        } else {
            outcome.reply
        };

        info!(
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls_made,
            reply_len = reply.len(),
            "Chat request answered"
        );

        let response = match state.response_shape {
            ResponseShape::Single => ChatResponse::Single {
                message: WireMessage::assistant(reply),
            },
            ResponseShape::History => {
                let mut history = caller;
                history.push(Message::assistant(&reply));
                let messages = trim_history(&history, state.history_pairs)
                    .iter()
                    .filter_map(WireMessage::from_message)
                    .collect();
                ChatResponse::History {
                    messages,
                    response: reply,
                }
            }
        };

        Ok(Json(response))
    }
    .instrument(span)
    .await
}
