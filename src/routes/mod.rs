// Route exports
pub mod emergency;
pub mod health;
pub mod requests;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::{authenticate, require_role, Claims};
use crate::core::DonorMatcher;
use crate::models::{ErrorResponse, Role};
use crate::services::{DonorRegistry, NotificationDispatcher, RequestStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn DonorRegistry>,
    pub store: Arc<dyn RequestStore>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub matcher: DonorMatcher,
    pub jwt_secret: Arc<str>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(requests::configure)
        .configure(emergency::configure);
}

/// JSON error body with a matching status
pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Identify the caller and check their role
pub(crate) fn authorize(
    req: &HttpRequest,
    state: &AppState,
    allowed: &[Role],
) -> Result<Claims, HttpResponse> {
    let claims = authenticate(req, &state.jwt_secret).map_err(|e| {
        tracing::info!("Rejected unauthenticated call to {}: {}", req.path(), e);
        error_response(e.status_code(), "Unauthorized", e.to_string())
    })?;

    require_role(&claims, allowed).map_err(|e| {
        tracing::info!("User {} denied on {}: {}", claims.user_id, req.path(), e);
        error_response(e.status_code(), "Forbidden", e.to_string())
    })?;

    Ok(claims)
}

/// Decode a JSON body; called after `authorize` so anonymous bodies are never parsed
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, HttpResponse> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::info!("Rejected malformed JSON body: {}", e);
        error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", e))
    })
}
