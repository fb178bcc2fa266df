//! Authorization endpoint.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use uuid::Uuid;

use super::IssuerState;
use crate::error::IssuerError;
use crate::oauth::{AuthorizationRequest, AuthorizationSuccessResponse};

/// Header carrying the caller's session id.
pub const SESSION_ID_HEADER: &str = "session-id";

/// `GET /authorization`: hand back the session's authorization code.
pub async fn authorization_handler(
    State(state): State<IssuerState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizationRequest>,
) -> Result<Json<AuthorizationSuccessResponse>, IssuerError> {
    let session_id = session_id_from(&headers)?;
    let response = state.authorization.authorize(session_id, &request).await?;
    Ok(Json(response))
}

fn session_id_from(headers: &HeaderMap) -> Result<Uuid, IssuerError> {
    let value = headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| IssuerError::session_validation("session-id header is required"))?;
    value
        .parse()
        .map_err(|_| IssuerError::session_validation("session-id header is not a UUID"))
}
