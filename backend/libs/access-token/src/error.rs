//! Error types for access token minting
//!
//! Every failure surfaces from `AccessToken::sign`. Grant and builder
//! constructors never fail. Messages must never carry the API-key secret.

use thiserror::Error;

/// Errors that can occur while minting an access token
#[derive(Debug, Error)]
pub enum AccessTokenError {
    /// Missing identity fields, empty secret, or non-positive validity window
    #[error("Invalid token configuration: {0}")]
    Config(String),

    /// A grant payload or the claim set could not be rendered as JSON
    #[error("Token serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cryptographic primitive reported a failure
    #[error("Internal signing error: {0}")]
    Internal(String),
}

impl AccessTokenError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Stable machine-readable code, in the style of the service error codes
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "TOKEN_CONFIG_INVALID",
            Self::Serialization(_) => "TOKEN_SERIALIZATION_FAILED",
            Self::Internal(_) => "TOKEN_INTERNAL_ERROR",
        }
    }
}

pub type Result<T, E = AccessTokenError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_converts_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AccessTokenError = parse_err.into();

        assert!(matches!(err, AccessTokenError::Serialization(_)));
        assert_eq!(err.code(), "TOKEN_SERIALIZATION_FAILED");
    }

    #[test]
    fn test_config_error_message() {
        let err = AccessTokenError::config("account SID is empty");
        assert_eq!(
            err.to_string(),
            "Invalid token configuration: account SID is empty"
        );
        assert_eq!(err.code(), "TOKEN_CONFIG_INVALID");
    }
}
