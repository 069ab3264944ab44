//! Decoded mesh representation.

use glam::Vec3;

/// Axis convention of a mesh's positions and normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axes {
    /// As stored in the container (Y up).
    #[default]
    Source,
    /// After the import fix-up (Z up).
    Scene,
}

/// Convert a point from the container's Y-up convention to Z-up.
///
/// `(x, y, z)` becomes `(x, -z, y)`, a quarter turn about the X axis.
#[must_use]
pub fn source_to_scene(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// A decoded triangle mesh.
///
/// Every face index is less than `vertices.len()`. When present, `normals`
/// has one entry per vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangles as 0-based vertex index triples.
    pub faces: Vec<[u32; 3]>,
    /// Per-vertex normals.
    pub normals: Option<Vec<Vec3>>,
    /// First UV channel, flat `[u0, v0, u1, v1, ..]` as stored.
    pub uvs: Option<Vec<f32>>,
    /// The `Color` attribute map, flat `[r0, g0, b0, a0, ..]` as stored.
    pub colors: Option<Vec<f32>>,
    /// Free-form comment from the container header.
    pub comment: String,
    axes: Axes,
}

impl Mesh {
    pub(crate) fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::default()
        }
    }

    /// The axis convention the positions are currently in.
    #[must_use]
    pub fn axes(&self) -> Axes {
        self.axes
    }

    /// Apply the import axis fix-up to positions and normals.
    ///
    /// This happens at most once: a mesh already in [`Axes::Scene`] is
    /// returned unchanged.
    #[must_use]
    pub fn into_scene_axes(mut self) -> Self {
        if self.axes == Axes::Source {
            for v in &mut self.vertices {
                *v = source_to_scene(*v);
            }
            if let Some(normals) = &mut self.normals {
                for n in normals {
                    *n = source_to_scene(*n);
                }
            }
            self.axes = Axes::Scene;
        }
        self
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }

    /// Extent of the bounding box along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.bounds().map_or(Vec3::ZERO, |(min, max)| max - min)
    }
}
