//! Storage collaborator traits.
//!
//! The protocol core owns no persistence. Embedders provide implementations
//! of these traits; `credence-store-memory` ships in-memory versions for
//! tests and development.

mod client;
mod identity;
mod session;

pub use client::ClientConfigProvider;
pub use identity::PersonIdentityStore;
pub use session::SessionStore;
