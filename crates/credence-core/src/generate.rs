//! Random identifier, code, and token generation.
//!
//! Authorization codes and bearer access tokens are 256-bit random values
//! encoded as base64url without padding (43 characters), exceeding the
//! OAuth 2.0 recommendation of at least 128 bits of entropy.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

/// Generates a new globally unique session identifier.
#[must_use]
pub fn session_id() -> Uuid {
    Uuid::new_v4()
}

/// Generates a fresh unguessable authorization code.
#[must_use]
pub fn authorization_code() -> String {
    random_token()
}

/// Generates an opaque bearer access token.
#[must_use]
pub fn access_token() -> String {
    random_token()
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_43_base64url_chars() {
        let code = authorization_code();
        assert_eq!(code.len(), 43);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn codes_are_unique() {
        let codes: Vec<String> = (0..100).map(|_| authorization_code()).collect();
        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn tokens_differ_from_codes() {
        assert_ne!(access_token(), authorization_code());
    }
}
