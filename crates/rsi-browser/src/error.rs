//! Error type for CLI commands.

use std::fmt;
use std::path::PathBuf;

/// Errors that end a single command.
#[derive(Debug)]
pub enum CommandError {
    /// Catalog request, cache or model failure.
    Catalog(rsi::Error),
    /// A local model file could not be decoded.
    Decode(ctm_decode::DecodeError),
    /// A local file could not be read or written.
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The ship has no resource of the requested kind.
    Missing {
        /// What is missing.
        what: &'static str,
        /// The ship's name.
        name: String,
    },
    /// A browse command referred to something that does not exist.
    Usage(String),
}

impl CommandError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Decode(e) => write!(f, "invalid model file: {e}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Missing { what, name } => write!(f, "{name} has no {what}"),
            Self::Usage(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Missing { .. } | Self::Usage(_) => None,
        }
    }
}

impl From<rsi::Error> for CommandError {
    fn from(e: rsi::Error) -> Self {
        Self::Catalog(e)
    }
}

impl From<ctm_decode::DecodeError> for CommandError {
    fn from(e: ctm_decode::DecodeError) -> Self {
        Self::Decode(e)
    }
}
