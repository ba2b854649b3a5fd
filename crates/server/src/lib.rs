//! Chat Agent Server
//!
//! Provides the inbound webhook and HTTP inspection endpoints for the menu
//! assistant, plus the outbound transports it replies through.

pub mod auth;
pub mod contacts;
pub mod http;
pub mod metrics;
pub mod state;
pub mod transport;

pub use auth::auth_middleware;
pub use contacts::ContactBook;
pub use http::create_router;
pub use metrics::{init_metrics, record_ignored, record_turn};
pub use state::AppState;
pub use transport::{GatewayTransport, OutboundKind, OutboundMessage, OutboxTransport};

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Auth(_) => axum::http::StatusCode::UNAUTHORIZED,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
