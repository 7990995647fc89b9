//! Error types for the live view client

use thiserror::Error;

/// Result type alias for live view operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while negotiating or supervising a live view
#[derive(Debug, Error)]
pub enum Error {
    /// The stream source descriptor could not be resolved (no usable path)
    #[error("Invalid stream source: {0}")]
    InvalidSource(String),

    /// The configured signaling base URL is unusable
    #[error("Invalid signaling base URL: {0}")]
    InvalidSignalingBase(String),

    /// The gateway reported that the requested stream path does not exist.
    ///
    /// Retrying against a nonexistent path cannot succeed, so this class
    /// exhausts the session's retry budget immediately.
    #[error("Stream path not found upstream: {path}")]
    StreamNotFound {
        /// Logical stream path that was requested
        path: String,
    },

    /// Signaling exchange failure (non-404 HTTP status or transport error)
    #[error("Signaling error: {0}")]
    Signaling(String),

    /// WebRTC stack failure (peer connection, offer, transceiver)
    #[error("WebRTC error: {0}")]
    WebRtc(String),

    /// The rendering surface rejected playback (autoplay policy)
    #[error("Playback rejected: {0}")]
    Playback(String),

    /// The client handle was used after final shutdown
    #[error("Live view session closed")]
    SessionClosed,
}

impl Error {
    /// Whether this failure exhausts the session's retry budget.
    ///
    /// Only the upstream-absence class (HTTP 404) is terminal; every other
    /// negotiation failure leaves the budget untouched.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::StreamNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_terminal() {
        assert!(Error::StreamNotFound {
            path: "cam1/stream".to_string()
        }
        .is_terminal());

        assert!(!Error::Signaling("gateway returned 500".to_string()).is_terminal());
        assert!(!Error::WebRtc("offer failed".to_string()).is_terminal());
        assert!(!Error::InvalidSource("no path".to_string()).is_terminal());
    }

    #[test]
    fn display_includes_stream_path() {
        let err = Error::StreamNotFound {
            path: "cam1/stream".to_string(),
        };
        assert!(err.to_string().contains("cam1/stream"));
    }
}
