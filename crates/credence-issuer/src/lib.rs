//! # credence-issuer
//!
//! Protocol core of the Credence credential issuer: the backend half of an
//! OAuth 2.0 authorization code grant used to issue verifiable credentials.
//!
//! - [`session`] - Encrypted session request validation and the session
//!   lifecycle state machine
//! - [`crypto`] - Compact envelope decryption with key-rotation fallback
//! - [`pii`] - Claim parsing that redacts sensitive values from errors
//! - [`oauth`] - Authorization and token endpoint logic
//! - [`storage`], [`audit`], [`metrics`] - Collaborator traits for
//!   persistence, audit events, and counters
//! - [`http`] - Thin axum adapters over the services
//!
//! Persistence, key management, audit delivery, and metrics backends all
//! live behind traits; `credence-store-memory` provides in-memory storage
//! for tests and development.

pub mod audit;
pub mod config;
pub mod crypto;
pub mod error;
pub mod http;
pub mod jwt;
pub mod metrics;
pub mod oauth;
pub mod pii;
pub mod session;
pub mod storage;
pub mod types;

pub use config::IssuerConfig;
pub use error::IssuerError;

/// Type alias for issuer results.
pub type IssuerResult<T> = std::result::Result<T, IssuerError>;
