use std::path::PathBuf;

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors returned by the notifications client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("invalid parameters: invalid {field} `{value}`, expected one of: {accepted}")]
    InvalidField {
        field: &'static str,
        value: String,
        accepted: String,
    },

    #[error("failed to load TLS certificate from {}: {reason}", path.display())]
    CertificateLoad { path: PathBuf, reason: String },

    #[error("failed to connect to {address}: {reason}")]
    Connection { address: String, reason: String },

    #[error("send failed: {source}")]
    Transport {
        #[from]
        source: TransportError,
    },

    #[error("failed to send notification after {attempts} attempts: {source}")]
    DispatchExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("client is closed")]
    Closed,
}

impl ClientError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn invalid_field(field: &'static str, value: impl Into<String>, accepted: &[&str]) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            accepted: accepted.join(", "),
        }
    }

    pub fn certificate_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CertificateLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn connection(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field for validation failures.
    pub fn invalid_field_name(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Number of send attempts made before giving up, if this is an exhaustion error.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::DispatchExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// A single failed `send` on a notification channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("remote call failed: {0}")]
    Status(#[from] tonic::Status),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("channel is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
