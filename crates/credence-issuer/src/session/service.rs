//! Session lifecycle management.
//!
//! Owns creation, authorization code issuance, lookup with read-time expiry
//! checks, and the single-use token exchange.

use std::sync::Arc;

use credence_core::{Clock, generate};
use uuid::Uuid;

use crate::audit::{AuditContext, AuditEventType, AuditSink};
use crate::config::IssuerConfig;
use crate::error::IssuerError;
use crate::storage::{PersonIdentityStore, SessionStore};
use crate::types::{BearerAccessToken, Session, SessionRequest};

/// Drives the session state machine over the injected store and clock.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    identity: Option<Arc<dyn PersonIdentityStore>>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    config: IssuerConfig,
}

impl SessionService {
    /// Creates a session service over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        identity: Option<Arc<dyn PersonIdentityStore>>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        config: IssuerConfig,
    ) -> Self {
        Self {
            store,
            identity,
            audit,
            clock,
            config,
        }
    }

    /// Creates and persists a new session from a validated request, hands
    /// the shared claims to the identity store, and publishes the start
    /// audit event. Returns the new session id.
    pub async fn create_session(&self, request: &SessionRequest) -> Result<Uuid, IssuerError> {
        let now = self.clock.now();
        let session = Session {
            session_id: generate::session_id(),
            client_id: request.client_id.clone(),
            subject: request.subject.clone(),
            state: request.state.clone(),
            redirect_uri: request.redirect_uri.clone(),
            created_at: now,
            expiry: now + self.config.session_ttl,
            authorization_code: None,
            authorization_code_expiry: None,
            access_token: None,
            access_token_exchanged_at: None,
            access_token_expiry: None,
            client_session_id: request.client_session_id.clone(),
            persistent_session_id: request.persistent_session_id.clone(),
            context: request.context.clone(),
            evidence_requested: request.evidence_requested.clone(),
            attempt_count: 0,
        };

        self.store.put(&session).await?;

        if let (Some(identity), Some(claims)) = (&self.identity, &request.shared_claims) {
            identity.save(session.session_id, claims).await?;
        }

        self.audit
            .publish(AuditEventType::Start, &AuditContext::for_session(&session))
            .await?;

        tracing::info!(
            session_id = %session.session_id,
            client_id = %session.client_id,
            client_session_id = session.client_session_id.as_deref(),
            "session created"
        );
        Ok(session.session_id)
    }

    /// Issues a fresh single-use authorization code for the session and
    /// persists it with its expiry.
    pub async fn issue_authorization_code(
        &self,
        session: &mut Session,
    ) -> Result<String, IssuerError> {
        let code = generate::authorization_code();
        let expiry = self.clock.now() + self.config.authorization_code_ttl;
        self.store
            .set_authorization_code(session.session_id, &code, expiry)
            .await?;
        session.authorization_code = Some(code.clone());
        session.authorization_code_expiry = Some(expiry);
        Ok(code)
    }

    /// Fetches a session by id, deriving expiry at read time.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Session, IssuerError> {
        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or(IssuerError::SessionNotFound)?;
        if session.is_expired(self.clock.now()) {
            return Err(IssuerError::SessionExpired);
        }
        Ok(session)
    }

    /// Fetches the live session holding this authorization code.
    pub async fn get_session_by_authorization_code(
        &self,
        code: &str,
    ) -> Result<Session, IssuerError> {
        let session = self
            .store
            .find_by_authorization_code(code)
            .await?
            .ok_or(IssuerError::SessionNotFound)?;
        let now = self.clock.now();
        if session.is_expired(now) {
            return Err(IssuerError::SessionExpired);
        }
        if session.is_authorization_code_expired(now) {
            return Err(IssuerError::AuthorizationCodeExpired);
        }
        Ok(session)
    }

    /// Exchanges the session's authorization code for a bearer token.
    ///
    /// A session whose code was already exchanged is a replay: any token
    /// still held is revoked best-effort and the exchange is rejected. The
    /// exchange timestamp marks the code as consumed and survives
    /// revocation, so later attempts stay rejected. The store-level
    /// conditional write is the backstop for concurrent exchanges; the race
    /// loser is also treated as a replay.
    pub async fn issue_access_token(
        &self,
        session: &Session,
    ) -> Result<BearerAccessToken, IssuerError> {
        if session.access_token.is_some() || session.access_token_exchanged_at.is_some() {
            if session.access_token.is_some() {
                if let Err(err) = self.store.revoke_access_token(session.session_id).await {
                    tracing::error!(
                        session_id = %session.session_id,
                        error = %err,
                        "failed to revoke access token after replay"
                    );
                }
            }
            return Err(IssuerError::ReplayDetected);
        }

        let token = generate::access_token();
        let now = self.clock.now();
        let expiry = now + self.config.access_token_ttl;
        let written = self
            .store
            .conditional_set_access_token(session.session_id, &token, now, expiry)
            .await?;
        if !written {
            return Err(IssuerError::ReplayDetected);
        }

        Ok(BearerAccessToken::new(
            token,
            self.config.access_token_ttl.as_secs(),
        ))
    }
}
