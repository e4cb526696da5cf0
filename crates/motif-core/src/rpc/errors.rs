use thiserror::Error;

use crate::utils::QuantityError;

/// Coarse classification of adapter failures.
///
/// The repository facade branches on this: only a [`RpcErrorKind::Transport`] failure is
/// considered a problem with the node itself. Remote and decode failures are answers about
/// the queried state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorKind {
    /// The node could not be reached or did not answer in time.
    Transport,
    /// The node answered with a JSON-RPC error object.
    Remote,
    /// The node answered, but the payload was not what the call expects.
    Decode,
}

impl RpcErrorKind {
    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport_error",
            Self::Remote => "remote_error",
            Self::Decode => "decode_error",
        }
    }
}

/// Errors that can occur when talking to the node.
///
/// `Clone` so a single failed fill can be handed to every coalesced cache waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RpcError {
    /// Request exceeded the configured timeout duration.
    #[error("Request timeout")]
    Timeout,

    /// Failed to reach the node (connection refused, reset, DNS).
    #[error("Transport failed: {0}")]
    Transport(String),

    /// HTTP-level error occurred (non-2xx status code).
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    /// JSON-RPC error object returned by the node.
    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },

    /// The response could not be parsed or the result had the wrong shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request could not be built locally.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Maximum concurrent requests limit has been reached.
    #[error("Concurrency limit reached: {0}")]
    ConcurrencyLimit(String),
}

impl RpcError {
    #[must_use]
    pub fn kind(&self) -> RpcErrorKind {
        match self {
            Self::Timeout | Self::Transport(_) | Self::Http(..) | Self::ConcurrencyLimit(_) => {
                RpcErrorKind::Transport
            }
            Self::Remote { .. } => RpcErrorKind::Remote,
            Self::Decode(_) | Self::InvalidRequest(_) => RpcErrorKind::Decode,
        }
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == RpcErrorKind::Transport
    }
}

impl From<QuantityError> for RpcError {
    fn from(error: QuantityError) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
