//! Session request validation and lifecycle management.

mod service;
mod validator;

pub use service::SessionService;
pub use validator::SessionRequestValidator;
