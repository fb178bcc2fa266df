//! Authorization and token endpoint logic.
//!
//! Transport-free: HTTP adapters in [`crate::http`] call into these
//! services and map errors to statuses.

mod authorize;
mod token;

pub use authorize::{
    AuthorizationRequest, AuthorizationService, AuthorizationSuccessResponse, WrappedValue,
};
pub use token::{TokenRequest, TokenService};

/// Client assertion type required on token requests.
pub const JWT_BEARER_ASSERTION_TYPE: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// The only grant type this issuer supports.
pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
