//! Signed JWT parsing and the signature verification seam.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::error::IssuerError;
use crate::types::ClientAuthConfig;

/// A parsed compact JWS: raw text plus decoded header and claims.
///
/// Parsing performs no verification; pair with a [`SignatureVerifier`].
#[derive(Debug, Clone)]
pub struct SignedJwt {
    raw: String,
    header: Value,
    claims: Value,
}

impl SignedJwt {
    /// Parses a compact JWS serialization.
    pub fn parse(raw: &str) -> Result<Self, IssuerError> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 3 || parts[2].is_empty() {
            return Err(IssuerError::session_validation(
                "request JWT is not a compact JWS",
            ));
        }
        let header = decode_json(parts[0], "JWT header")?;
        let claims = decode_json(parts[1], "JWT claims")?;
        Ok(Self {
            raw: raw.to_string(),
            header,
            claims,
        })
    }

    /// The compact serialization this JWT was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The decoded JOSE header.
    #[must_use]
    pub fn header(&self) -> &Value {
        &self.header
    }

    /// The decoded claims set.
    #[must_use]
    pub fn claims(&self) -> &Value {
        &self.claims
    }

    /// Returns a string claim, if present and a string.
    #[must_use]
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Returns an integer claim, if present and numeric.
    #[must_use]
    pub fn claim_i64(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(Value::as_i64)
    }
}

fn decode_json(part: &str, what: &str) -> Result<Value, IssuerError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| IssuerError::session_validation(format!("{what} is not valid base64url")))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| IssuerError::session_validation(format!("{what} is not valid JSON")))
}

/// Verifies a JWT signature against a client's registered key material.
pub trait SignatureVerifier: Send + Sync {
    /// Returns `Ok(())` when the signature is valid for `config`.
    fn verify(&self, jwt: &SignedJwt, config: &ClientAuthConfig) -> Result<(), IssuerError>;
}

/// Bundled verifier over the client's PEM public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWebTokenVerifier;

impl SignatureVerifier for JsonWebTokenVerifier {
    fn verify(&self, jwt: &SignedJwt, config: &ClientAuthConfig) -> Result<(), IssuerError> {
        let algorithm: Algorithm = config.signing_algorithm.parse().map_err(|_| {
            IssuerError::client_configuration(format!(
                "unsupported signing algorithm '{}'",
                config.signing_algorithm
            ))
        })?;

        let key = match algorithm {
            Algorithm::ES256 | Algorithm::ES384 => {
                DecodingKey::from_ec_pem(config.public_signing_key.as_bytes())
            }
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
                DecodingKey::from_rsa_pem(config.public_signing_key.as_bytes())
            }
            other => {
                return Err(IssuerError::client_configuration(format!(
                    "signing algorithm {other:?} is not accepted"
                )));
            }
        }
        .map_err(|_| IssuerError::client_configuration("client public key is not valid PEM"))?;

        // Signature check only; claim-level checks belong to the validator.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<Value>(jwt.raw(), &key, &validation)
            .map(|_| ())
            .map_err(|_| IssuerError::session_validation("JWT signature verification failed"))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{SignatureVerifier, SignedJwt};
    use crate::error::IssuerError;
    use crate::types::ClientAuthConfig;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// Accepts every signature. For exercising validator and endpoint logic
    /// without real key material.
    #[derive(Debug, Default)]
    pub struct AcceptAllVerifier;

    impl SignatureVerifier for AcceptAllVerifier {
        fn verify(&self, _jwt: &SignedJwt, _config: &ClientAuthConfig) -> Result<(), IssuerError> {
            Ok(())
        }
    }

    /// Rejects every signature.
    #[derive(Debug, Default)]
    pub struct RejectAllVerifier;

    impl SignatureVerifier for RejectAllVerifier {
        fn verify(&self, _jwt: &SignedJwt, _config: &ClientAuthConfig) -> Result<(), IssuerError> {
            Err(IssuerError::session_validation(
                "JWT signature verification failed",
            ))
        }
    }

    /// Builds an unsigned-but-well-formed compact JWS around `claims`.
    pub fn fake_jws(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        let signature = URL_SAFE_NO_PAD.encode(b"test-signature");
        format!("{header}.{body}.{signature}")
    }
}
