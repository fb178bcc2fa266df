//! Issuer error types.
//!
//! One tagged error enumeration covers every protocol failure, with explicit
//! mappings to OAuth 2.0 error codes and HTTP status classes. Session and
//! code lookup failures deliberately map to an indistinguishable forbidden
//! response so callers cannot probe authorization-code validity.

use std::fmt;

/// Errors that can occur while validating requests and driving the session
/// lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    /// The session request is malformed, failed decryption, failed signature
    /// verification, or failed redirect-URI pinning.
    #[error("Session validation failed: {message}")]
    SessionValidation {
        /// Server-side description; never returned to the caller verbatim.
        message: String,
    },

    /// Client registration data is missing or unusable. This is the server's
    /// fault, never the caller's.
    #[error("Client configuration error: {message}")]
    ClientConfiguration {
        /// Description of the configuration fault.
        message: String,
    },

    /// No session exists for the given id or authorization code.
    #[error("Session not found")]
    SessionNotFound,

    /// The session exists but its expiry timestamp has passed.
    #[error("Session expired")]
    SessionExpired,

    /// The authorization code exists but its expiry timestamp has passed.
    #[error("Authorization code expired")]
    AuthorizationCodeExpired,

    /// The identity-evidence journey has not completed for this session.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The token request is malformed or its client assertion, redirect URI,
    /// or grant parameters do not match the session.
    #[error("Token validation failed: {message}")]
    TokenValidation {
        /// Description of the token request fault.
        message: String,
    },

    /// An already-consumed authorization code was presented again.
    #[error("Authorization code used too many times")]
    ReplayDetected,

    /// An error occurred while reading or writing the session store.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An audit event could not be published. Audit completeness is a
    /// compliance requirement, so this propagates.
    #[error("Audit error: {message}")]
    Audit {
        /// Description of the audit failure.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl IssuerError {
    /// Creates a new `SessionValidation` error.
    #[must_use]
    pub fn session_validation(message: impl Into<String>) -> Self {
        Self::SessionValidation {
            message: message.into(),
        }
    }

    /// Creates a new `ClientConfiguration` error.
    #[must_use]
    pub fn client_configuration(message: impl Into<String>) -> Self {
        Self::ClientConfiguration {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `TokenValidation` error.
    #[must_use]
    pub fn token_validation(message: impl Into<String>) -> Self {
        Self::TokenValidation {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Audit` error.
    #[must_use]
    pub fn audit(message: impl Into<String>) -> Self {
        Self::Audit {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::SessionValidation { .. }
                | Self::SessionNotFound
                | Self::SessionExpired
                | Self::AuthorizationCodeExpired
                | Self::AccessDenied { .. }
                | Self::TokenValidation { .. }
                | Self::ReplayDetected
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ClientConfiguration { .. }
                | Self::Storage { .. }
                | Self::Audit { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SessionValidation { .. } => ErrorCategory::Validation,
            Self::ClientConfiguration { .. } => ErrorCategory::Configuration,
            Self::SessionNotFound
            | Self::SessionExpired
            | Self::AuthorizationCodeExpired
            | Self::AccessDenied { .. } => ErrorCategory::Authorization,
            Self::TokenValidation { .. } | Self::ReplayDetected => ErrorCategory::Token,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Audit { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::SessionValidation { .. } => "invalid_request",
            Self::SessionNotFound
            | Self::SessionExpired
            | Self::AuthorizationCodeExpired
            | Self::AccessDenied { .. } => "access_denied",
            Self::TokenValidation { .. } | Self::ReplayDetected => "invalid_grant",
            Self::ClientConfiguration { .. }
            | Self::Storage { .. }
            | Self::Audit { .. }
            | Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code this error maps to.
    ///
    /// Not-found, expired, and access-denied outcomes all map to 403 with no
    /// distinguishing detail, per the anti-probing requirement.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::SessionValidation { .. }
            | Self::TokenValidation { .. }
            | Self::ReplayDetected => 400,
            Self::SessionNotFound
            | Self::SessionExpired
            | Self::AuthorizationCodeExpired
            | Self::AccessDenied { .. } => 403,
            Self::ClientConfiguration { .. }
            | Self::Storage { .. }
            | Self::Audit { .. }
            | Self::Internal { .. } => 500,
        }
    }
}

/// Categories of issuer errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation errors.
    Validation,
    /// Authorization errors (lookup, expiry, access denial).
    Authorization,
    /// Token exchange errors.
    Token,
    /// Client registration configuration errors.
    Configuration,
    /// Storage and audit infrastructure errors.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Configuration => write!(f, "configuration"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
