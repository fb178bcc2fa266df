//! Shared-claims persistence trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::IssuerError;
use crate::types::SharedClaims;

/// Stores the identity claims handed over at session creation, keyed by
/// session id.
#[async_trait]
pub trait PersonIdentityStore: Send + Sync {
    /// Saves the claims for a session.
    async fn save(&self, session_id: Uuid, claims: &SharedClaims) -> Result<(), IssuerError>;
}
