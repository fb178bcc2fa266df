//! Session persistence trait.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::IssuerError;
use crate::types::Session;

/// Durable session storage.
///
/// Implementations must make [`conditional_set_access_token`] atomic with
/// respect to concurrent callers: when two exchanges race, exactly one may
/// observe `true`.
///
/// [`conditional_set_access_token`]: SessionStore::conditional_set_access_token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetches a session by id.
    async fn get(&self, session_id: Uuid) -> Result<Option<Session>, IssuerError>;

    /// Finds the session currently holding this authorization code.
    async fn find_by_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<Session>, IssuerError>;

    /// Inserts or replaces a session record.
    async fn put(&self, session: &Session) -> Result<(), IssuerError>;

    /// Attaches an authorization code and its expiry to a session.
    async fn set_authorization_code(
        &self,
        session_id: Uuid,
        code: &str,
        expiry: OffsetDateTime,
    ) -> Result<(), IssuerError>;

    /// Sets the access token if and only if the session's code was never
    /// exchanged before.
    ///
    /// Returns `true` when the write happened, `false` when a prior token
    /// or exchange timestamp was already present.
    async fn conditional_set_access_token(
        &self,
        session_id: Uuid,
        token: &str,
        exchanged_at: OffsetDateTime,
        expiry: OffsetDateTime,
    ) -> Result<bool, IssuerError>;

    /// Clears any access token held by the session. The exchange timestamp
    /// must survive revocation so the code stays consumed.
    async fn revoke_access_token(&self, session_id: Uuid) -> Result<(), IssuerError>;
}
