//! Errors returned by protocol calls.

use thiserror::Error;

/// Protocol call errors.
///
/// Only [`ClientError::NotSupported`] is a definitive "capability absent"
/// answer from the target; every other variant is a fault.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The target explicitly reported the function as not implemented.
    #[error("function not supported: {0}")]
    NotSupported(String),

    /// The target rejected the calling user.
    #[error("user not authorized: {0}")]
    NotAuthorized(String),

    /// The requested instance or type is not known to the target.
    #[error("not known: {0}")]
    NotFound(String),

    /// The target returned an error envelope.
    #[error("server error {exception}: {message}")]
    Server {
        /// Exception class reported by the target
        exception: String,
        /// Error message reported by the target
        message: String,
    },

    /// Unexpected HTTP status without a recognizable error envelope.
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Connection or protocol-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The client could not be built.
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the target definitively reported the capability as absent.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, ClientError::NotSupported(_))
    }

    /// Whether the target reported the requested instance as unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type for protocol calls.
pub type ClientResult<T> = Result<T, ClientError>;
