//! Client registration lookup trait.

use async_trait::async_trait;

use crate::error::IssuerError;
use crate::types::ClientAuthConfig;

/// Resolves registered authentication material for a client id.
#[async_trait]
pub trait ClientConfigProvider: Send + Sync {
    /// Returns the client's registration, or `None` when the client id is
    /// unknown.
    async fn client_auth_config(
        &self,
        client_id: &str,
    ) -> Result<Option<ClientAuthConfig>, IssuerError>;
}
