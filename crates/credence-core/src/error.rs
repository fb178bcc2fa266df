//! Core error type.

/// Errors raised by core primitives.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value could not be decoded from its wire encoding.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// A timestamp could not be parsed or formatted.
    #[error("Invalid timestamp: {message}")]
    InvalidTimestamp {
        /// Description of the timestamp fault.
        message: String,
    },
}

impl CoreError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidTimestamp` error.
    #[must_use]
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = CoreError::encoding("bad base64");
        assert_eq!(err.to_string(), "Encoding error: bad base64");
    }
}
