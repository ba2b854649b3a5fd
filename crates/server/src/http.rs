//! HTTP Endpoints
//!
//! Inbound webhook for the chat gateway plus inspection endpoints.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use chat_agent_core::{ConversationId, InboundMessage};

use crate::auth::auth_middleware;
use crate::metrics::{self, metrics_handler};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api = Router::new()
        .route("/api/messages", post(receive_message))
        .route("/api/conversations", get(list_conversations))
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(reset_conversation),
        )
        .route("/api/conversations/:id/outbox", get(get_outbox))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(api)
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

/// Inbound message as delivered by the chat gateway
#[derive(Debug, Deserialize)]
struct InboundRequest {
    from: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    sender_name: Option<String>,
}

/// Run one dialogue turn for an inbound message
async fn receive_message(
    State(state): State<AppState>,
    Json(request): Json<InboundRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let from = request.from.trim();
    if from.is_empty() {
        return Err(ServerError::InvalidRequest("missing sender".to_string()).into());
    }

    if !state.config.transport.accepts(from) {
        tracing::debug!(from, "Ignoring message from non-private conversation");
        metrics::record_ignored("not_private");
        return Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "ignored": true,
                "reason": "not a private conversation",
            })),
        ));
    }

    let id = ConversationId::new(from);
    let mut message = InboundMessage::new(id.clone(), request.body);
    if let Some(name) = request.sender_name {
        state.contacts.remember(&id, &name);
        message = message.with_sender_name(name);
    }

    // Run detached so a dropped request cannot cut a turn short
    let agent = state.agent.clone();
    let report = tokio::spawn(async move { agent.handle(message).await })
        .await
        .map_err(|e| {
            tracing::error!(conversation_id = %id, error = %e, "Turn task failed");
            StatusCode::from(ServerError::Internal(e.to_string()))
        })?;

    metrics::record_turn(&report);

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "ignored": false,
            "conversation_id": report.conversation_id,
            "outcome": report.outcome,
            "mode": report.state.mode.display_name(),
            "state": report.state,
            "effects": report.effects,
            "execution": report.execution,
        })),
    ))
}

/// List known conversations
async fn list_conversations(State(state): State<AppState>) -> Json<serde_json::Value> {
    let conversations = state.agent.store().ids();
    Json(serde_json::json!({
        "conversations": conversations,
        "count": conversations.len(),
    }))
}

/// Current dialogue state of a conversation
async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let id = ConversationId::new(id);
    let conversation = state
        .agent
        .store()
        .snapshot(&id)
        .await
        .ok_or_else(|| ServerError::NotFound(id.to_string()))?;

    Ok(Json(serde_json::json!({
        "conversation_id": id,
        "mode": conversation.mode.display_name(),
        "state": conversation,
    })))
}

/// Forget a conversation so its next message starts over
async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    let id = ConversationId::new(id);
    if !state.agent.store().remove(&id).await {
        return StatusCode::NOT_FOUND;
    }

    tracing::info!(conversation_id = %id, "Conversation reset");
    StatusCode::NO_CONTENT
}

/// Outbound messages recorded for a conversation
async fn get_outbox(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let outbox = state.outbox.as_ref().ok_or_else(|| {
        ServerError::NotFound("outbox disabled while a gateway is configured".to_string())
    })?;

    let id = ConversationId::new(id);
    let messages = outbox.messages(&id).unwrap_or_default();
    Ok(Json(serde_json::json!({
        "conversation_id": id,
        "messages": messages,
        "count": messages.len(),
    })))
}

/// Liveness plus a few cheap dependency checks
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();

    let executor = state.agent.executor();
    let document = &executor.config().schedule_document;
    let cached = executor.attachments().is_cached(document);
    checks.insert(
        "schedule_document".to_string(),
        serde_json::json!({
            "status": if cached { "ok" } else { "not_loaded" },
            "name": document,
        }),
    );

    let store = state.agent.store();
    checks.insert(
        "conversations".to_string(),
        serde_json::json!({
            "status": "ok",
            "count": store.len(),
            "capacity": store.capacity(),
        }),
    );

    checks.insert(
        "transport".to_string(),
        serde_json::json!({
            "status": "ok",
            "name": executor.transport().name(),
        }),
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks,
        })),
    )
}
