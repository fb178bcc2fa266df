//! Token endpoint.

use axum::Form;
use axum::Json;
use axum::extract::State;

use super::IssuerState;
use crate::error::IssuerError;
use crate::oauth::TokenRequest;
use crate::types::BearerAccessToken;

/// `POST /token`: exchange an authorization code for a bearer token.
pub async fn token_handler(
    State(state): State<IssuerState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<BearerAccessToken>, IssuerError> {
    let token = state.tokens.exchange(&request).await?;
    Ok(Json(token))
}
