//! Method-independent body contents and their conversion into a [`Mesh`].

use glam::Vec3;

use crate::error::{DecodeError, DecodeResult};
use crate::mesh::Mesh;

/// Name of the attribute map carrying per-vertex color.
pub const COLOR_MAP: &str = "Color";

/// A named per-vertex float map (UV channel or generic attribute).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FloatMap {
    pub name: String,
    pub values: Vec<f32>,
}

/// Arrays read from a container body, before validation.
#[derive(Debug, Default)]
pub(crate) struct Body {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<Vec3>>,
    pub uv_maps: Vec<FloatMap>,
    pub attrib_maps: Vec<FloatMap>,
}

impl Body {
    /// Validate the arrays and assemble the mesh.
    ///
    /// Only the first UV channel and the attribute map named `Color` are
    /// kept; both are passed through in their stored layout.
    pub(crate) fn into_mesh(self, comment: String) -> DecodeResult<Mesh> {
        check_indices(&self.indices, self.vertices.len())?;
        check_finite(&self.vertices, "vertices")?;
        if let Some(normals) = &self.normals {
            check_finite(normals, "normals")?;
        }

        let faces = self
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let mut mesh = Mesh::new(self.vertices, faces);
        mesh.normals = self.normals;
        mesh.uvs = self.uv_maps.into_iter().next().map(|m| m.values);
        mesh.colors = self
            .attrib_maps
            .into_iter()
            .find(|m| m.name == COLOR_MAP)
            .map(|m| m.values);
        mesh.comment = comment;
        Ok(mesh)
    }
}

/// Fail if any index does not reference one of `vertex_count` vertices.
pub(crate) fn check_indices(indices: &[u32], vertex_count: usize) -> DecodeResult<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(DecodeError::IndexOutOfBounds {
            index,
            len: vertex_count,
        }),
        None => Ok(()),
    }
}

fn check_finite(values: &[Vec3], context: &'static str) -> DecodeResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(DecodeError::NonFinite { context, position }),
        None => Ok(()),
    }
}

/// Number of scalars in `count` elements of `size` components.
pub(crate) fn elements(count: usize, size: usize, context: &'static str) -> DecodeResult<usize> {
    count
        .checked_mul(size)
        .ok_or_else(|| DecodeError::InvalidFormat {
            context,
            detail: format!("{count} x {size} elements overflows"),
        })
}

/// Group a flat `[x0, y0, z0, x1, ..]` buffer into vectors.
pub(crate) fn group3(flat: &[f32]) -> Vec<Vec3> {
    flat.chunks_exact(3).map(Vec3::from_slice).collect()
}
