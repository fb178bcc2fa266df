//! HTTP adapters over the protocol services.
//!
//! Handlers stay thin: extract, delegate, map. All policy lives in the
//! session and oauth modules.

mod authorization;
mod session;
mod token;

pub use authorization::{SESSION_ID_HEADER, authorization_handler};
pub use session::{SessionCreatedResponse, session_handler};
pub use token::token_handler;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use crate::error::IssuerError;
use crate::oauth::{AuthorizationService, TokenService};
use crate::session::{SessionRequestValidator, SessionService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct IssuerState {
    pub validator: Arc<SessionRequestValidator>,
    pub sessions: Arc<SessionService>,
    pub authorization: Arc<AuthorizationService>,
    pub tokens: Arc<TokenService>,
}

/// Builds the issuer's route set.
pub fn router(state: IssuerState) -> Router {
    Router::new()
        .route("/session", post(session_handler))
        .route("/authorization", get(authorization_handler))
        .route("/token", post(token_handler))
        .with_state(state)
}

/// OAuth-style error body: `{ "error": ..., "error_description": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl IntoResponse for IssuerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            tracing::error!(category = %self.category(), error = %self, "request failed");
        } else {
            tracing::warn!(category = %self.category(), error = %self, "request rejected");
        }

        let body = OAuthErrorBody {
            error: self.oauth_error_code().to_string(),
            error_description: public_description(&self),
        };
        (status, axum::Json(body)).into_response()
    }
}

/// Descriptions safe to return to the caller. Lookup failures stay silent
/// so codes cannot be probed, and server faults reveal nothing.
fn public_description(err: &IssuerError) -> Option<String> {
    match err {
        IssuerError::ReplayDetected => Some(err.to_string()),
        IssuerError::TokenValidation { message } => Some(message.clone()),
        IssuerError::SessionValidation { .. } => Some("request validation failed".to_string()),
        _ => None,
    }
}
