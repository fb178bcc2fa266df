//! # credence-core
//!
//! Core primitives shared across the Credence credential issuer:
//!
//! - [`time`] - Injectable clock abstraction for deterministic expiry checks
//! - [`generate`] - Cryptographically random identifiers, codes, and tokens
//! - [`error`] - Core error type

pub mod error;
pub mod generate;
pub mod time;

pub use error::CoreError;
pub use time::{Clock, FixedClock, SystemClock};

/// Type alias for core results.
pub type Result<T> = std::result::Result<T, CoreError>;
