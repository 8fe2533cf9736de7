//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Command ran but exited unsuccessfully
    #[error("Command `{command}` failed (exit code {code:?}): {stderr}")]
    Exec {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Command could not be started
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Exit code of a failed command, if any
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Exec { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_display() {
        let err = Error::Exec {
            command: "grep -q x file".to_string(),
            code: Some(1),
            stderr: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("grep -q x file"));
        assert!(msg.contains("Some(1)"));
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(Error::Other("x".into()).exit_code(), None);
    }
}
