//! Normal reconstruction for the MG2 method.
//!
//! MG2 stores each normal as a magnitude plus two quantized spherical angles
//! measured in a local frame around the vertex's smooth normal. The smooth
//! normals are recomputed from the already-restored geometry.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec3;

/// Area-independent vertex normals: the normalized sum of the unit normals
/// of every triangle touching the vertex.
pub(crate) fn smooth_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let v1 = vertices[b] - vertices[a];
        let v2 = vertices[c] - vertices[a];
        let mut n = v1.cross(v2);
        let len = n.length();
        if len > 1.0e-10 {
            n /= len;
        }
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in &mut normals {
        let len = n.length();
        if len > 1.0e-20 {
            *n /= len;
        }
    }

    normals
}

/// Orthonormal frame `(x, y, z)` with `z` along `normal`.
///
/// The `x` axis is `(0,0,1) x n + (1,0,0) x n`, which is never zero for a
/// unit normal and varies continuously with it.
pub(crate) fn normal_frame(normal: Vec3) -> [Vec3; 3] {
    let z = normal;
    let mut x = Vec3::new(-normal.y, normal.x - normal.z, normal.y);
    let len = (2.0 * x.x * x.x + x.y * x.y).sqrt();
    if len > 1.0e-20 {
        x /= len;
    }
    let y = z.cross(x);
    [x, y, z]
}

/// Rebuild normals from `(magnitude, phi, theta)` integer triples.
pub(crate) fn restore_normals(
    packed: &[u32],
    vertices: &[Vec3],
    indices: &[u32],
    precision: f32,
) -> Vec<Vec3> {
    let smooth = smooth_normals(vertices, indices);

    packed
        .chunks_exact(3)
        .zip(smooth)
        .map(|(n, smooth)| {
            #[allow(clippy::cast_precision_loss)]
            let magnitude = n[0] as f32 * precision;

            let int_phi = n[1];
            #[allow(clippy::cast_precision_loss)]
            let phi = int_phi as f32 * FRAC_PI_2 * precision;

            let theta = if int_phi == 0 {
                0.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                let theta_scale = if int_phi <= 4 {
                    FRAC_PI_2
                } else {
                    TAU / int_phi as f32
                };
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
                let int_theta = n[2] as i32 as f32;
                int_theta * theta_scale - PI
            };

            let local = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            let [x, y, z] = normal_frame(smooth);
            (x * local.x + y * local.y + z * local.z) * magnitude
        })
        .collect()
}
