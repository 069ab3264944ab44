//! Triangle index restoration for the compressed methods.

/// Undo the delta coding applied to triangle indices by MG1 and MG2.
///
/// Per triangle `(a, b, c)`:
/// - `a` is a delta against the previous triangle's `a`,
/// - `c` is a delta against `a`,
/// - `b` is a delta against the previous triangle's `b` when both triangles
///   share the same `a`, otherwise against `a`.
///
/// Arithmetic wraps, matching the unsigned encoder.
pub(crate) fn restore_indices(indices: &mut [u32]) {
    let triangle_count = indices.len() / 3;
    for i in 0..triangle_count {
        let t = i * 3;
        if i >= 1 {
            indices[t] = indices[t].wrapping_add(indices[t - 3]);
        }

        indices[t + 2] = indices[t + 2].wrapping_add(indices[t]);

        if i >= 1 && indices[t] == indices[t - 3] {
            indices[t + 1] = indices[t + 1].wrapping_add(indices[t - 2]);
        } else {
            indices[t + 1] = indices[t + 1].wrapping_add(indices[t]);
        }
    }
}
