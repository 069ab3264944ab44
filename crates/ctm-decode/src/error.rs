//! Error types for decoding operations.

use std::fmt;

/// OpenCTM error code category for a failed decode.
///
/// These mirror the codes the reference OpenCTM library reports from its
/// context, so callers that surface "error code + message" can keep doing so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The container structure is malformed (bad magic, unexpected chunk).
    BadFormat,
    /// The container is well-formed but describes an invalid mesh.
    InvalidMesh,
    /// An LZMA payload could not be decompressed.
    LzmaError,
    /// The container uses a format version this decoder does not read.
    UnsupportedFormatVersion,
    /// The buffer ended before the container did.
    FileError,
}

impl ErrorCode {
    /// The name OpenCTM uses for this code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadFormat => "CTM_BAD_FORMAT",
            Self::InvalidMesh => "CTM_INVALID_MESH",
            Self::LzmaError => "CTM_LZMA_ERROR",
            Self::UnsupportedFormatVersion => "CTM_UNSUPPORTED_FORMAT_VERSION",
            Self::FileError => "CTM_FILE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while decoding an OpenCTM container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer does not start with the `OCTM` magic.
    BadMagic { found: [u8; 4] },
    /// The container version is not supported.
    UnsupportedVersion { version: u32 },
    /// The compression method FourCC is unknown.
    UnknownMethod { found: [u8; 4] },
    /// A chunk tag did not match the one required at this position.
    UnexpectedChunk {
        expected: &'static str,
        found: [u8; 4],
    },
    /// Input ended before the expected data.
    UnexpectedEof {
        context: &'static str,
        needed: usize,
        remaining: usize,
    },
    /// Invalid data format or structure.
    InvalidFormat {
        context: &'static str,
        detail: String,
    },
    /// A triangle references a vertex that does not exist.
    IndexOutOfBounds { index: u32, len: usize },
    /// A vertex, normal or map value is NaN or infinite.
    NonFinite { context: &'static str, position: usize },
    /// LZMA decompression failed.
    Lzma { context: &'static str, detail: String },
}

impl DecodeError {
    /// The OpenCTM error code category of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BadMagic { .. }
            | Self::UnknownMethod { .. }
            | Self::UnexpectedChunk { .. }
            | Self::InvalidFormat { .. } => ErrorCode::BadFormat,
            Self::UnsupportedVersion { .. } => ErrorCode::UnsupportedFormatVersion,
            Self::UnexpectedEof { .. } => ErrorCode::FileError,
            Self::IndexOutOfBounds { .. } | Self::NonFinite { .. } => ErrorCode::InvalidMesh,
            Self::Lzma { .. } => ErrorCode::LzmaError,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code())?;
        match self {
            Self::BadMagic { found } => {
                write!(f, "not an OpenCTM container (magic {})", fourcc(found))
            }
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported container version {version}")
            }
            Self::UnknownMethod { found } => {
                write!(f, "unknown compression method {}", fourcc(found))
            }
            Self::UnexpectedChunk { expected, found } => {
                write!(f, "expected chunk {expected}, found {}", fourcc(found))
            }
            Self::UnexpectedEof {
                context,
                needed,
                remaining,
            } => write!(
                f,
                "unexpected end of buffer in {context}: needed {needed} bytes, {remaining} left"
            ),
            Self::InvalidFormat { context, detail } => {
                write!(f, "invalid format in {context}: {detail}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for {len} vertices")
            }
            Self::NonFinite { context, position } => {
                write!(f, "non-finite value in {context} at position {position}")
            }
            Self::Lzma { context, detail } => {
                write!(f, "lzma decompression of {context} failed: {detail}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Render a FourCC for messages, escaping non-printable bytes.
fn fourcc(tag: &[u8; 4]) -> String {
    tag.iter()
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DecodeError::BadMagic { found: *b"GLTF" };
        assert_eq!(err.code(), ErrorCode::BadFormat);

        let err = DecodeError::IndexOutOfBounds { index: 9, len: 3 };
        assert_eq!(err.code(), ErrorCode::InvalidMesh);

        let err = DecodeError::UnsupportedVersion { version: 4 };
        assert_eq!(err.code(), ErrorCode::UnsupportedFormatVersion);
    }

    #[test]
    fn test_display_includes_code_and_escapes_tag() {
        let err = DecodeError::UnknownMethod { found: *b"MG3\0" };
        assert_eq!(
            err.to_string(),
            "CTM_BAD_FORMAT: unknown compression method MG3\\x00"
        );
    }
}
