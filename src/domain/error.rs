//! Engine error taxonomy
//!
//! Every failure the engine reports carries a machine-readable [`ErrorKind`]
//! and a short human message suitable for a transient notification.

use std::fmt;

use thiserror::Error;

/// Longest prefix of a collaborator message kept in [`EngineError::TransportFailure`]
pub const TRANSPORT_MESSAGE_LIMIT: usize = 160;

/// Error kinds surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Ambiguous,
    MalformedAbi,
    MissingArgument,
    InvalidArgument,
    ArgumentCountMismatch,
    AmbiguousReadResult,
    UserRejected,
    ChainUnregistrable,
    RegistrationFailed,
    DeploymentMissingBytecode,
    NotConnected,
    TransportFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::MalformedAbi => "malformed-abi",
            ErrorKind::MissingArgument => "missing-argument",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::ArgumentCountMismatch => "argument-count-mismatch",
            ErrorKind::AmbiguousReadResult => "ambiguous-read-result",
            ErrorKind::UserRejected => "user-rejected",
            ErrorKind::ChainUnregistrable => "chain-unregistrable",
            ErrorKind::RegistrationFailed => "registration-failed",
            ErrorKind::DeploymentMissingBytecode => "deployment-missing-bytecode",
            ErrorKind::NotConnected => "not-connected",
            ErrorKind::TransportFailure => "transport-failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured engine error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Ambiguous(String),

    #[error("malformed ABI: {0}")]
    MalformedAbi(String),

    #[error("missing value for argument '{0}'")]
    MissingArgument(String),

    #[error("invalid value for argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("read of '{0}' does not yield a single value")]
    AmbiguousReadResult(String),

    #[error("request rejected in wallet")]
    UserRejected,

    #[error("chain {0} is unknown to the wallet; add chainName, rpcUrls and nativeCurrency to the button")]
    ChainUnregistrable(u64),

    #[error("could not register chain {chain_id}: {reason}")]
    RegistrationFailed { chain_id: u64, reason: String },

    #[error("deployment requires bytecode in 'data'")]
    DeploymentMissingBytecode,

    #[error("no wallet account connected")]
    NotConnected,

    #[error("{0}")]
    TransportFailure(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::Ambiguous(_) => ErrorKind::Ambiguous,
            EngineError::MalformedAbi(_) => ErrorKind::MalformedAbi,
            EngineError::MissingArgument(_) => ErrorKind::MissingArgument,
            EngineError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            EngineError::ArgumentCountMismatch { .. } => ErrorKind::ArgumentCountMismatch,
            EngineError::AmbiguousReadResult(_) => ErrorKind::AmbiguousReadResult,
            EngineError::UserRejected => ErrorKind::UserRejected,
            EngineError::ChainUnregistrable(_) => ErrorKind::ChainUnregistrable,
            EngineError::RegistrationFailed { .. } => ErrorKind::RegistrationFailed,
            EngineError::DeploymentMissingBytecode => ErrorKind::DeploymentMissingBytecode,
            EngineError::NotConnected => ErrorKind::NotConnected,
            EngineError::TransportFailure(_) => ErrorKind::TransportFailure,
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an opaque collaborator failure, keeping only a short first-line prefix
    pub fn transport(message: impl fmt::Display) -> Self {
        EngineError::TransportFailure(truncate_message(&message.to_string()))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

fn truncate_message(message: &str) -> String {
    let line = message.lines().next().unwrap_or("").trim();
    if line.chars().count() <= TRANSPORT_MESSAGE_LIMIT {
        return line.to_string();
    }
    let prefix: String = line.chars().take(TRANSPORT_MESSAGE_LIMIT).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keeps_first_line() {
        let err = EngineError::transport("rpc timeout\nat frame 1\nat frame 2");
        assert_eq!(err.to_string(), "rpc timeout");
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }

    #[test]
    fn test_transport_truncates_long_message() {
        let long = "x".repeat(500);
        let EngineError::TransportFailure(message) = EngineError::transport(long) else {
            panic!("expected transport failure");
        };
        assert_eq!(message.chars().count(), TRANSPORT_MESSAGE_LIMIT + 1);
        assert!(message.ends_with('…'));
    }

    #[test]
    fn test_missing_argument_message_names_parameter() {
        let err = EngineError::MissingArgument("amount".into());
        assert_eq!(err.kind(), ErrorKind::MissingArgument);
        assert!(err.to_string().contains("amount"));
    }
}
