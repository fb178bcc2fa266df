//! # credence-store-memory
//!
//! In-memory implementations of the issuer storage traits, for tests and
//! development deployments. Data lives in process memory and is lost on
//! restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use credence_issuer::error::IssuerError;
use credence_issuer::storage::{ClientConfigProvider, PersonIdentityStore, SessionStore};
use credence_issuer::types::{ClientAuthConfig, Session, SharedClaims};

/// Session store backed by a `HashMap` behind an async `RwLock`.
///
/// The conditional access-token write happens under the write lock, so
/// concurrent exchanges serialize and exactly one can observe the absent
/// prior state.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` when no sessions are held.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: Uuid) -> Result<Option<Session>, IssuerError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn find_by_authorization_code(
        &self,
        code: &str,
    ) -> Result<Option<Session>, IssuerError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.authorization_code.as_deref() == Some(code))
            .cloned())
    }

    async fn put(&self, session: &Session) -> Result<(), IssuerError> {
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn set_authorization_code(
        &self,
        session_id: Uuid,
        code: &str,
        expiry: OffsetDateTime,
    ) -> Result<(), IssuerError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(IssuerError::SessionNotFound)?;
        session.authorization_code = Some(code.to_string());
        session.authorization_code_expiry = Some(expiry);
        Ok(())
    }

    async fn conditional_set_access_token(
        &self,
        session_id: Uuid,
        token: &str,
        exchanged_at: OffsetDateTime,
        expiry: OffsetDateTime,
    ) -> Result<bool, IssuerError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(IssuerError::SessionNotFound)?;
        if session.access_token.is_some() || session.access_token_exchanged_at.is_some() {
            return Ok(false);
        }
        session.access_token = Some(token.to_string());
        session.access_token_exchanged_at = Some(exchanged_at);
        session.access_token_expiry = Some(expiry);
        Ok(true)
    }

    async fn revoke_access_token(&self, session_id: Uuid) -> Result<(), IssuerError> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&session_id) {
            // The exchange timestamp stays: it marks the code as consumed.
            session.access_token = None;
            session.access_token_expiry = None;
        }
        Ok(())
    }
}

/// Identity store backed by a `HashMap` keyed by session id.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    claims: Arc<RwLock<HashMap<Uuid, SharedClaims>>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the claims saved for a session.
    pub async fn get(&self, session_id: Uuid) -> Option<SharedClaims> {
        self.claims.read().await.get(&session_id).cloned()
    }
}

#[async_trait]
impl PersonIdentityStore for InMemoryIdentityStore {
    async fn save(&self, session_id: Uuid, claims: &SharedClaims) -> Result<(), IssuerError> {
        self.claims.write().await.insert(session_id, claims.clone());
        Ok(())
    }
}

/// Client registry backed by a `HashMap` keyed by client id.
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    clients: HashMap<String, ClientAuthConfig>,
}

impl InMemoryClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client, replacing any existing registration.
    pub fn register(&mut self, client_id: impl Into<String>, config: ClientAuthConfig) {
        self.clients.insert(client_id.into(), config);
    }
}

#[async_trait]
impl ClientConfigProvider for InMemoryClientRegistry {
    async fn client_auth_config(
        &self,
        client_id: &str,
    ) -> Result<Option<ClientAuthConfig>, IssuerError> {
        Ok(self.clients.get(client_id).cloned())
    }
}
