//! Protocol error types

use thiserror::Error;

/// Protocol-level errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Mode override value is not a small decimal number
    #[error("Invalid mode override: {0:?}")]
    InvalidMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::InvalidMode("abc".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid mode override"));
        assert!(msg.contains("abc"));
    }
}
