//! Little-endian cursor over a container buffer.
//!
//! A `Reader` is the parse context for a single decode. It borrows the input
//! buffer and owns nothing else, so it is released when the decode returns,
//! on success or on error.

use crate::error::{DecodeError, DecodeResult};

/// Cursor over an OpenCTM byte stream.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes left after the cursor.
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Take the next `len` bytes.
    pub(crate) fn read_bytes(&mut self, len: usize, context: &'static str) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                context,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub(crate) fn read_u32(&mut self, context: &'static str) -> DecodeResult<u32> {
        let bytes = self.read_bytes(4, context)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_f32(&mut self, context: &'static str) -> DecodeResult<f32> {
        self.read_u32(context).map(f32::from_bits)
    }

    /// Read a count field, widened for indexing.
    pub(crate) fn read_count(&mut self, context: &'static str) -> DecodeResult<usize> {
        self.read_u32(context).map(|v| v as usize)
    }

    pub(crate) fn read_tag(&mut self, context: &'static str) -> DecodeResult<[u8; 4]> {
        let bytes = self.read_bytes(4, context)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a chunk tag and fail unless it is `expected`.
    pub(crate) fn expect_tag(&mut self, expected: &'static str) -> DecodeResult<()> {
        let found = self.read_tag(expected)?;
        if found.as_slice() != expected.as_bytes() {
            return Err(DecodeError::UnexpectedChunk { expected, found });
        }
        Ok(())
    }

    /// Read a length-prefixed string. Invalid UTF-8 is replaced, not rejected.
    pub(crate) fn read_string(&mut self, context: &'static str) -> DecodeResult<String> {
        let len = self.read_count(context)?;
        let bytes = self.read_bytes(len, context)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub(crate) fn read_u32_array(
        &mut self,
        count: usize,
        context: &'static str,
    ) -> DecodeResult<Vec<u32>> {
        let bytes = self.read_bytes(byte_len(count, context)?, context)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    pub(crate) fn read_f32_array(
        &mut self,
        count: usize,
        context: &'static str,
    ) -> DecodeResult<Vec<f32>> {
        let bytes = self.read_bytes(byte_len(count, context)?, context)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

/// Size in bytes of `count` 32-bit words.
fn byte_len(count: usize, context: &'static str) -> DecodeResult<usize> {
    count.checked_mul(4).ok_or_else(|| DecodeError::InvalidFormat {
        context,
        detail: format!("element count {count} overflows"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_scalars() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        let mut reader = Reader::new(&data);

        assert_eq!(reader.read_u32("a").unwrap(), 7);
        assert!((reader.read_f32("b").unwrap() - 1.5).abs() < f32::EPSILON);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [1, 2, 3];
        let mut reader = Reader::new(&data);
        assert_eq!(
            reader.read_u32("count"),
            Err(DecodeError::UnexpectedEof {
                context: "count",
                needed: 4,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_expect_tag_mismatch() {
        let mut reader = Reader::new(b"VERT");
        assert_eq!(
            reader.expect_tag("INDX"),
            Err(DecodeError::UnexpectedChunk {
                expected: "INDX",
                found: *b"VERT"
            })
        );
    }

    #[test]
    fn test_read_string() {
        let mut data = Vec::new();
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(b"Color");
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_string("name").unwrap(), "Color");
    }

    #[test]
    fn test_read_arrays() {
        let mut data = Vec::new();
        for v in [1u32, 2, 3] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u32_array(3, "indices").unwrap(), vec![1, 2, 3]);

        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_f32_array(4, "vertices"),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }
}
