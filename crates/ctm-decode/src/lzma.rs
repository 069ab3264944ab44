//! Raw LZMA payload decompression.

use std::io::Read;

use xz2::read::XzDecoder;
use xz2::stream::Stream;

use crate::error::{DecodeError, DecodeResult};

/// Number of LZMA property bytes stored in front of every packed array.
pub(crate) const PROPS_LEN: usize = 5;

/// Decompress a raw LZMA stream of known output size.
///
/// OpenCTM stores the five property bytes and the compressed stream with no
/// size field. liblzma reads the legacy `.lzma` container, which is exactly
/// those property bytes followed by a little-endian `u64` size, so the
/// container is rebuilt in front of the payload.
pub(crate) fn uncompress(
    props: &[u8; PROPS_LEN],
    packed: &[u8],
    unpacked_len: usize,
    context: &'static str,
) -> DecodeResult<Vec<u8>> {
    let lzma_error = |detail: String| DecodeError::Lzma { context, detail };

    let mut alone = Vec::with_capacity(PROPS_LEN + 8 + packed.len());
    alone.extend_from_slice(props);
    alone.extend_from_slice(&(unpacked_len as u64).to_le_bytes());
    alone.extend_from_slice(packed);

    let stream = Stream::new_lzma_decoder(u64::MAX).map_err(|e| lzma_error(e.to_string()))?;
    let decoder = XzDecoder::new_stream(alone.as_slice(), stream);

    // Read one byte past the expected size so an oversized stream is caught.
    let mut out = Vec::new();
    decoder
        .take(unpacked_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| lzma_error(e.to_string()))?;

    if out.len() != unpacked_len {
        return Err(lzma_error(format!(
            "expected {unpacked_len} bytes, got {}",
            out.len()
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_lzma_error() {
        // lc=3, lp=0, pb=2 and a 64 KiB dictionary, followed by noise.
        let props = [0x5D, 0x00, 0x00, 0x01, 0x00];
        let result = uncompress(&props, &[0xFF; 16], 64, "vertices");
        assert!(matches!(
            result,
            Err(DecodeError::Lzma {
                context: "vertices",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_props_is_lzma_error() {
        let props = [0xFF; PROPS_LEN];
        assert!(uncompress(&props, &[0; 8], 4, "indices").is_err());
    }
}
