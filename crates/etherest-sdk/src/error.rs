//! SDK error types

use serde_json::Value;
use thiserror::Error;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Query executed without a bound or explicit address
    #[error("Missing target: {0}")]
    MissingTarget(String),

    /// Address handle has no client to dispatch through
    #[error("Address {0} is not bound to a client")]
    Unbound(String),

    /// No operation installed under this name
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Operation only builds queries and has no execution mode
    #[error("Operation {0} builds a query and cannot be invoked directly")]
    NotInvocable(String),

    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body is not a valid JSON envelope
    #[error("Envelope parse error: {0}")]
    EnvelopeParse(String),

    /// Error value carried by the response envelope
    #[error("Remote error: {0}")]
    Remote(Value),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl SdkError {
    /// Returns the remote error payload, if this error came from the envelope
    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            SdkError::Remote(value) => Some(value),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(e: toml::de::Error) -> Self {
        SdkError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_payload_is_verbatim() {
        let err = SdkError::Remote(json!({"code": 4, "message": "invalid method"}));
        assert_eq!(
            err.remote_payload(),
            Some(&json!({"code": 4, "message": "invalid method"}))
        );
        assert!(SdkError::Transport("refused".into()).remote_payload().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = SdkError::MissingTarget("no address provided to execute call using".into());
        assert_eq!(
            err.to_string(),
            "Missing target: no address provided to execute call using"
        );
    }
}
