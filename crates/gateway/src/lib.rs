//! HTTP surface for ragloop.
//!
//! Two routes:
//! - `GET /` health check, no downstream calls
//! - `POST /chat` runs the conversation loop over the caller's messages
//!
//! Built on Axum; every long-lived collaborator is built once at start-up
//! and shared read-only through [`GatewayState`].

pub mod chat;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ragloop_agent::{AgentLoop, AgentRuntime};
use ragloop_config::{AppConfig, ResponseShape};

pub use chat::{ChatRequest, ChatResponse, NO_REPLY, WireMessage, WireRole};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub response_shape: ResponseShape,
    pub history_pairs: usize,
}

impl GatewayState {
    pub fn new(agent: Arc<AgentLoop>, config: &AppConfig) -> Self {
        Self {
            agent,
            response_shape: config.gateway.response_shape,
            history_pairs: config.agent.history_pairs,
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with both routes and the HTTP middleware.
///
/// Layers applied:
/// - CORS allowing any origin, method and header
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/chat", post(chat::chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Resolves credentials, builds the runtime once, confirms the vector
/// collection exists, then serves until SIGINT or SIGTERM.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = config.credentials()?;
    let runtime = AgentRuntime::build(&config, &credentials)?;
    runtime.preflight().await?;

    let state = Arc::new(GatewayState::new(runtime.agent.clone(), &config));
    let app = build_router(state, config.gateway.body_limit_bytes);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, shape = ?config.gateway.response_shape, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use ragloop_core::error::{ProviderError, RetrievalError};
    use ragloop_core::message::{Message, MessageToolCall};
    use ragloop_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use ragloop_core::retrieval::{Document, Retriever};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replays scripted assistant messages, one per call.
    struct ScriptedProvider {
        replies: Mutex<Vec<Message>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let message = self.replies.lock().unwrap().pop().ok_or_else(|| {
                ProviderError::ApiError {
                    status_code: 500,
                    message: "script exhausted".into(),
                }
            })?;
            Ok(ProviderResponse {
                message,
                usage: None,
                model: request.model,
            })
        }
    }

    struct FixedRetriever;

    #[async_trait]
    impl Retriever for FixedRetriever {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn retrieve(&self, _query: &str) -> Result<Vec<Document>, RetrievalError> {
            Ok(vec![Document::new("Registration takes about two weeks.")])
        }
    }

    fn tool_call_reply() -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "retrieve_context".into(),
            arguments: r#"{"query":"registration time"}"#.into(),
        }];
        msg
    }

    fn app_with(replies: Vec<Message>, shape: ResponseShape) -> Router {
        let tools = ragloop_tools::default_registry(Arc::new(FixedRetriever)).unwrap();
        let agent = AgentLoop::new(
            ScriptedProvider::new(replies),
            "mock-model",
            0.7,
            Arc::new(tools),
            "test prompt",
        );
        let mut config = AppConfig::default();
        config.gateway.response_shape = shape;
        build_router(
            Arc::new(GatewayState::new(Arc::new(agent), &config)),
            config.gateway.body_limit_bytes,
        )
    }

    async fn post_chat(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app_with(vec![], ResponseShape::History);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[tokio::test]
    async fn chat_returns_history_and_reply() {
        let app = app_with(
            vec![tool_call_reply(), Message::assistant("About two weeks.")],
            ResponseShape::History,
        );
        let (status, json) = post_chat(
            app,
            serde_json::json!({"messages": [{"role": "user", "content": "How long does registration take?"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "About two weeks.");
        assert_eq!(
            json["messages"],
            serde_json::json!([
                {"role": "user", "content": "How long does registration take?"},
                {"role": "assistant", "content": "About two weeks."}
            ])
        );
    }

    #[tokio::test]
    async fn chat_single_shape() {
        let app = app_with(vec![Message::assistant("Hello!")], ResponseShape::Single);
        let (status, json) =
            post_chat(app, serde_json::json!({"messages": {"content": "Hi"}})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"message": {"role": "assistant", "content": "Hello!"}})
        );
    }

    #[tokio::test]
    async fn empty_reply_gets_sentinel() {
        let app = app_with(vec![Message::assistant("")], ResponseShape::History);
        let (status, json) =
            post_chat(app, serde_json::json!({"messages": [{"content": "Hi"}]})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], NO_REPLY);
        assert_eq!(json["messages"][1]["content"], NO_REPLY);
    }

    #[tokio::test]
    async fn whitespace_reply_is_returned_as_is() {
        let app = app_with(vec![Message::assistant("  ")], ResponseShape::History);
        let (status, json) =
            post_chat(app, serde_json::json!({"messages": [{"content": "Hello"}]})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "  ");
        assert_eq!(json["messages"][1]["content"], "  ");
    }

    #[tokio::test]
    async fn history_is_trimmed_to_three_pairs() {
        let app = app_with(vec![Message::assistant("fifth answer")], ResponseShape::History);
        let mut messages = Vec::new();
        for i in 0..4 {
            messages.push(serde_json::json!({"role": "user", "content": format!("q{i}")}));
            messages.push(serde_json::json!({"role": "assistant", "content": format!("a{i}")}));
        }
        messages.push(serde_json::json!({"role": "user", "content": "q4"}));

        let (status, json) = post_chat(app, serde_json::json!({"messages": messages})).await;
        assert_eq!(status, StatusCode::OK);

        let echoed = json["messages"].as_array().unwrap();
        assert_eq!(echoed.len(), 6);
        assert_eq!(echoed[0]["content"], "q2");
        assert_eq!(echoed[5]["content"], "fifth answer");
    }

    #[tokio::test]
    async fn empty_message_list_is_bad_request() {
        let app = app_with(vec![], ResponseShape::History);
        let (status, json) = post_chat(app, serde_json::json!({"messages": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = app_with(vec![], ResponseShape::History);
        let (status, _) = post_chat(app, serde_json::json!({"msgs": "hi"})).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        // script exhausted on the first call
        let app = app_with(vec![], ResponseShape::History);
        let (status, json) =
            post_chat(app, serde_json::json!({"messages": [{"content": "Hi"}]})).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("script exhausted"));
    }

    #[tokio::test]
    async fn unknown_tool_is_bad_gateway() {
        let mut bad = Message::assistant("");
        bad.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: "{}".into(),
        }];
        let app = app_with(vec![bad], ResponseShape::History);
        let (status, json) =
            post_chat(app, serde_json::json!({"messages": [{"content": "Search"}]})).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("web_search"));
    }
}
