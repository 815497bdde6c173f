//! Contains the `Error` and `Result` types used throughout this crate.

use thiserror::Error;

/// The result type used by this crate's fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while driving a SCRAM authentication attempt.
///
/// The inner [`ErrorKind`] is boxed so that `Error` stays cheap to move around call
/// stacks even though some variants carry a server-supplied message.
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
#[non_exhaustive]
pub struct Error {
    /// The specific kind of failure.
    pub kind: Box<ErrorKind>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// `true` if this error must never be retried by any caller, regardless of the
    /// caller's own retry policy: `ServerSignatureInvalid` is always fatal.
    pub fn is_never_retryable(&self) -> bool {
        matches!(*self.kind, ErrorKind::ServerSignatureInvalid { .. })
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        ErrorKind::InvalidInput {
            reason: reason.into(),
        }
        .into()
    }

    pub(crate) fn randomness_unavailable(reason: impl Into<String>) -> Self {
        ErrorKind::RandomnessUnavailable {
            reason: reason.into(),
        }
        .into()
    }

    /// Constructs a transport-level failure.
    ///
    /// Public so a [`Connection`](crate::Connection) implementation outside this
    /// crate can report its own socket/timeout failures as this crate's `Error`
    /// type, as its trait contract requires.
    pub fn transport(mechanism: &str, reason: impl Into<String>) -> Self {
        ErrorKind::AuthTransportError {
            mechanism: mechanism.to_string(),
            reason: reason.into(),
        }
        .into()
    }

    pub(crate) fn server(mechanism: &str, message: impl Into<String>) -> Self {
        ErrorKind::AuthServerError {
            mechanism: mechanism.to_string(),
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn weak_iterations(mechanism: &str, iterations: usize) -> Self {
        ErrorKind::WeakIterations {
            mechanism: mechanism.to_string(),
            iterations,
        }
        .into()
    }

    pub(crate) fn invalid_nonce(mechanism: &str, reason: impl Into<String>) -> Self {
        ErrorKind::InvalidNonce {
            mechanism: mechanism.to_string(),
            reason: reason.into(),
        }
        .into()
    }

    pub(crate) fn server_signature_invalid(mechanism: &str) -> Self {
        ErrorKind::ServerSignatureInvalid {
            mechanism: mechanism.to_string(),
        }
        .into()
    }

    /// Constructs a cancellation failure.
    ///
    /// Public for the same reason as [`Error::transport`]: cancellation is
    /// observed by whatever is driving the conversation's `async fn` (e.g. a
    /// `tokio::select!` around its future), not by this crate itself.
    pub fn cancelled(mechanism: &str) -> Self {
        ErrorKind::AuthCancelled {
            mechanism: mechanism.to_string(),
        }
        .into()
    }

    pub(crate) fn invalid_server_response(mechanism: &str) -> Self {
        ErrorKind::AuthServerError {
            mechanism: mechanism.to_string(),
            message: "invalid server response".to_string(),
        }
        .into()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// The taxonomy of errors a SCRAM authentication attempt can fail with.
///
/// Variants deliberately carry only data safe to surface to a caller or a log
/// sink: the mechanism name, the server's own error text, and the iteration
/// count. None carry the password, the salted password, any derived key, or the
/// client proof.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Non-text credentials or an empty password, raised before any I/O.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Nonce generation failed because the underlying RNG failed.
    #[error("could not generate a nonce: {reason}")]
    RandomnessUnavailable { reason: String },

    /// The connection returned a transport-level failure.
    #[error("{mechanism} failure: {reason}")]
    AuthTransportError { mechanism: String, reason: String },

    /// The server returned a structured error (`$err`, `errmsg`, or SASL `e=`).
    #[error("{mechanism} failure: {message}")]
    AuthServerError { mechanism: String, message: String },

    /// The server proposed an iteration count below the minimum this crate accepts.
    #[error("{mechanism} failure: iteration count {iterations} is below the minimum of 4096")]
    WeakIterations { mechanism: String, iterations: usize },

    /// The server's combined nonce is malformed or does not extend the client nonce.
    #[error("{mechanism} failure: invalid nonce ({reason})")]
    InvalidNonce { mechanism: String, reason: String },

    /// The server's `v=` attribute did not match this client's expected HMAC.
    ///
    /// Indicates a man-in-the-middle or a misconfigured server. Always fatal; see
    /// [`Error::is_never_retryable`].
    #[error("{mechanism} failure: server signature did not match")]
    ServerSignatureInvalid { mechanism: String },

    /// Cancellation was observed at a suspension point.
    #[error("{mechanism} authentication was cancelled")]
    AuthCancelled { mechanism: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_signature_invalid_is_never_retryable() {
        let err: Error = ErrorKind::ServerSignatureInvalid {
            mechanism: "SCRAM-SHA-256".to_string(),
        }
        .into();
        assert!(err.is_never_retryable());
    }

    #[test]
    fn other_kinds_are_retryable() {
        let err: Error = ErrorKind::AuthTransportError {
            mechanism: "SCRAM-SHA-256".to_string(),
            reason: "connection reset".to_string(),
        }
        .into();
        assert!(!err.is_never_retryable());
    }
}
