//! Container header parsing.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::Reader;

/// The only container version written by OpenCTM 1.x.
pub const FORMAT_VERSION: u32 = 5;

/// Header flag: the container stores per-vertex normals.
pub const HAS_NORMALS: u32 = 0x0000_0001;

/// Body compression method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Uncompressed arrays.
    Raw,
    /// LZMA-packed arrays with delta-coded indices.
    Mg1,
    /// LZMA-packed quantized arrays on a spatial grid.
    Mg2,
}

impl Method {
    fn from_tag(tag: [u8; 4]) -> DecodeResult<Self> {
        match &tag {
            b"RAW\0" => Ok(Self::Raw),
            b"MG1\0" => Ok(Self::Mg1),
            b"MG2\0" => Ok(Self::Mg2),
            _ => Err(DecodeError::UnknownMethod { found: tag }),
        }
    }

    /// FourCC written in the header for this method.
    #[must_use]
    pub fn tag(self) -> [u8; 4] {
        match self {
            Self::Raw => *b"RAW\0",
            Self::Mg1 => *b"MG1\0",
            Self::Mg2 => *b"MG2\0",
        }
    }
}

/// Fixed-size container header followed by the file comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub method: Method,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub uv_map_count: usize,
    pub attrib_map_count: usize,
    pub flags: u32,
    pub comment: String,
}

impl Header {
    pub(crate) fn read(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let magic = reader.read_tag("magic")?;
        if &magic != b"OCTM" {
            return Err(DecodeError::BadMagic { found: magic });
        }

        let version = reader.read_u32("version")?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion { version });
        }

        let method = Method::from_tag(reader.read_tag("method")?)?;
        let vertex_count = reader.read_count("vertex count")?;
        let triangle_count = reader.read_count("triangle count")?;
        let uv_map_count = reader.read_count("uv map count")?;
        let attrib_map_count = reader.read_count("attribute map count")?;
        let flags = reader.read_u32("flags")?;
        let comment = reader.read_string("comment")?;

        if triangle_count > 0 && vertex_count == 0 {
            return Err(DecodeError::InvalidFormat {
                context: "header",
                detail: format!("{triangle_count} triangles but no vertices"),
            });
        }

        Ok(Self {
            method,
            vertex_count,
            triangle_count,
            uv_map_count,
            attrib_map_count,
            flags,
            comment,
        })
    }

    /// Whether the body carries a normals chunk.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        self.flags & HAS_NORMALS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: u32, method: &[u8; 4], flags: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"OCTM");
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(method);
        for count in [4u32, 2, 1, 0] {
            data.extend_from_slice(&count.to_le_bytes());
        }
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(b"hi");
        data
    }

    #[test]
    fn test_read_header() {
        let data = header_bytes(5, b"MG1\0", HAS_NORMALS);
        let header = Header::read(&mut Reader::new(&data)).unwrap();

        assert_eq!(header.method, Method::Mg1);
        assert_eq!(header.vertex_count, 4);
        assert_eq!(header.triangle_count, 2);
        assert_eq!(header.uv_map_count, 1);
        assert_eq!(header.attrib_map_count, 0);
        assert!(header.has_normals());
        assert_eq!(header.comment, "hi");
    }

    #[test]
    fn test_rejects_old_version() {
        let data = header_bytes(4, b"RAW\0", 0);
        assert_eq!(
            Header::read(&mut Reader::new(&data)),
            Err(DecodeError::UnsupportedVersion { version: 4 })
        );
    }

    #[test]
    fn test_rejects_unknown_method() {
        let data = header_bytes(5, b"ZIP\0", 0);
        assert!(matches!(
            Header::read(&mut Reader::new(&data)),
            Err(DecodeError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = header_bytes(5, b"RAW\0", 0);
        data[0] = b'X';
        assert!(matches!(
            Header::read(&mut Reader::new(&data)),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_method_tag_roundtrip() {
        for method in [Method::Raw, Method::Mg1, Method::Mg2] {
            assert_eq!(Method::from_tag(method.tag()), Ok(method));
        }
    }
}
