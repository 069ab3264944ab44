//! Error types for the rsi crate.

use std::fmt;
use std::path::PathBuf;

/// Result type for rsi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause of a failed request.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or HTTP failure.
    Fetch,
    /// Malformed mesh container.
    Format,
    /// Cache filesystem failure.
    Io,
    /// Upstream data did not have the expected shape.
    InvalidData,
}

/// Errors that can occur in rsi operations.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed, or its body could not be read or parsed.
    Fetch {
        /// The URL that failed.
        url: String,
        /// The step that failed.
        context: &'static str,
        /// The underlying error.
        source: BoxError,
    },
    /// HTTP response had a non-success status code.
    Status {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// Mesh decoding failed.
    Format(ctm_decode::DecodeError),
    /// Cache filesystem operation failed.
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// Invalid data in a response or argument.
    InvalidData {
        /// Context for where the error occurred.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl Error {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch { .. } | Error::Status { .. } => ErrorKind::Fetch,
            Error::Format(_) => ErrorKind::Format,
            Error::Io { .. } => ErrorKind::Io,
            Error::InvalidData { .. } => ErrorKind::InvalidData,
        }
    }

    pub(crate) fn fetch(url: &str, context: &'static str, source: impl Into<BoxError>) -> Self {
        Error::Fetch {
            url: url.to_string(),
            context,
            source: source.into(),
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fetch { url, context, source } => {
                write!(f, "error fetching {url}: {context}: {source}")
            }
            Error::Status { url, status } => {
                write!(f, "error fetching {url}: status {status}")
            }
            Error::Format(e) => write!(f, "invalid model file: {e}"),
            Error::Io {
                operation,
                path,
                source,
            } => {
                write!(f, "cache {operation} failed for {}: {source}", path.display())
            }
            Error::InvalidData { context, detail } => {
                write!(f, "invalid {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Fetch { source, .. } => Some(&**source),
            Error::Format(e) => Some(e),
            Error::Io { source, .. } => Some(source),
            Error::Status { .. } | Error::InvalidData { .. } => None,
        }
    }
}

impl From<ctm_decode::DecodeError> for Error {
    fn from(e: ctm_decode::DecodeError) -> Self {
        Error::Format(e)
    }
}
