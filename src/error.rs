// Error kinds surfaced by the library. The binary wraps these in
// `anyhow` with extra context; library callers can match on them.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while talking to a node.
#[derive(Debug, Error)]
pub enum IpfsError {
    /// The base URL given to `Client::new` is not usable.
    #[error("invalid node URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Filesystem failure while building a request body.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection failure during the HTTP exchange.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The configured deadline elapsed before the exchange completed.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// An add response line is not a `{Name, Hash, Size}` object.
    #[error("cannot decode add response {line:?}: {reason}")]
    Decode { line: String, reason: String },

    /// The node answered 404.
    #[error("not found: {body}")]
    NotFound { body: String },

    /// The node answered with any other non-2xx status.
    #[error("node returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
}

impl IpfsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IpfsError::Io {
            path: path.into(),
            source,
        }
    }

    /// Map a transport error, splitting deadline expiry from other failures.
    pub(crate) fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IpfsError::Timeout { url: url.to_string() }
        } else {
            IpfsError::Network(err)
        }
    }

    /// Map a non-2xx status and its body.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let body = body.trim().to_string();
        if status == 404 {
            IpfsError::NotFound { body }
        } else {
            IpfsError::Remote { status, body }
        }
    }
}

pub type Result<T> = std::result::Result<T, IpfsError>;
