//! API key authentication
//!
//! When `server.api_key` is set, `/api` requests must carry it in the
//! `x-api-key` header.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::state::AppState;
use crate::ServerError;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.server.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let matches = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|key| constant_time_eq(key.as_bytes(), expected.as_bytes()));

    match matches {
        Some(true) => Ok(next.run(req).await),
        Some(false) => {
            tracing::warn!(path = %req.uri().path(), "Rejected request with invalid API key");
            Err(ServerError::Auth("invalid API key".to_string()).into())
        },
        None => Err(ServerError::Auth(format!("missing {} header", API_KEY_HEADER)).into()),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
