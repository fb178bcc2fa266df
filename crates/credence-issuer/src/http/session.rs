//! Session creation endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IssuerState;
use crate::error::IssuerError;
use crate::types::RawSessionRequest;

/// Body of a successful session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// `POST /session`: validate the encrypted request and create a session.
pub async fn session_handler(
    State(state): State<IssuerState>,
    Json(raw): Json<RawSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), IssuerError> {
    let request = state.validator.validate(&raw).await?;
    let session_id = state.sessions.create_session(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id,
            state: request.state,
            redirect_uri: request.redirect_uri,
        }),
    ))
}
