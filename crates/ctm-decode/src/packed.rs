//! Packed array decoding for the MG1 and MG2 methods.
//!
//! A packed array is stored as:
//!
//! ```text
//! u32        packed size
//! [u8; 5]    LZMA properties
//! [u8; n]    LZMA stream
//! ```
//!
//! The decompressed buffer holds `count * size` 32-bit words split into four
//! byte planes, most significant plane first. Within a plane the words are
//! grouped by component: all `count` values of component 0, then component 1,
//! and so on.

use crate::error::{DecodeError, DecodeResult};
use crate::lzma::{self, PROPS_LEN};
use crate::reader::Reader;

/// Read a packed array of unsigned integers.
pub(crate) fn read_packed_u32(
    reader: &mut Reader<'_>,
    count: usize,
    size: usize,
    context: &'static str,
) -> DecodeResult<Vec<u32>> {
    let planes = read_planes(reader, count, size, context)?;
    Ok(deinterleave(&planes, count, size))
}

/// Read a packed array of signed integers stored in sign-magnitude form.
pub(crate) fn read_packed_i32(
    reader: &mut Reader<'_>,
    count: usize,
    size: usize,
    context: &'static str,
) -> DecodeResult<Vec<i32>> {
    let planes = read_planes(reader, count, size, context)?;
    Ok(deinterleave(&planes, count, size)
        .into_iter()
        .map(from_sign_magnitude)
        .collect())
}

/// Read a packed array of IEEE-754 floats.
pub(crate) fn read_packed_f32(
    reader: &mut Reader<'_>,
    count: usize,
    size: usize,
    context: &'static str,
) -> DecodeResult<Vec<f32>> {
    let planes = read_planes(reader, count, size, context)?;
    Ok(deinterleave(&planes, count, size)
        .into_iter()
        .map(f32::from_bits)
        .collect())
}

fn read_planes(
    reader: &mut Reader<'_>,
    count: usize,
    size: usize,
    context: &'static str,
) -> DecodeResult<Vec<u8>> {
    let packed_size = reader.read_count(context)?;
    let props = reader.read_bytes(PROPS_LEN, context)?;
    let props: [u8; PROPS_LEN] = [props[0], props[1], props[2], props[3], props[4]];
    let packed = reader.read_bytes(packed_size, context)?;

    let unpacked_len = count
        .checked_mul(size)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DecodeError::InvalidFormat {
            context,
            detail: format!("{count} x {size} elements overflows"),
        })?;

    lzma::uncompress(&props, packed, unpacked_len, context)
}

/// Reassemble `count * size` words from their byte planes.
///
/// `planes.len()` must be `count * size * 4`.
pub(crate) fn deinterleave(planes: &[u8], count: usize, size: usize) -> Vec<u32> {
    let n = count * size;
    debug_assert_eq!(planes.len(), n * 4);

    let mut words = Vec::with_capacity(n);
    for i in 0..count {
        for k in 0..size {
            let j = i + k * count;
            words.push(
                (u32::from(planes[j]) << 24)
                    | (u32::from(planes[n + j]) << 16)
                    | (u32::from(planes[2 * n + j]) << 8)
                    | u32::from(planes[3 * n + j]),
            );
        }
    }
    words
}

/// Undo the sign folding used for signed packed integers.
///
/// Even values are non-negative (`x / 2`), odd values are negative
/// (`-(x + 1) / 2`).
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn from_sign_magnitude(x: u32) -> i32 {
    if x & 1 == 0 {
        (x >> 1) as i32
    } else {
        (((x >> 1) + 1) as i32).wrapping_neg()
    }
}
