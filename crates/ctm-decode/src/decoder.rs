//! Container decoding entry point.

use crate::error::DecodeResult;
use crate::header::{Header, Method};
use crate::mesh::{Axes, Mesh};
use crate::reader::Reader;
use crate::{mg1, mg2, raw};

/// OpenCTM decoder.
///
/// A decoder holds configuration only. Each call to [`Decoder::decode`]
/// opens its own parse context and releases it before returning, so one
/// decoder can be reused freely, including after a failed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    axes: Axes,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// A decoder that returns meshes in the scene's Z-up convention.
    #[must_use]
    pub fn new() -> Self {
        Self { axes: Axes::Scene }
    }

    /// A decoder that leaves positions exactly as stored.
    #[must_use]
    pub fn source_axes() -> Self {
        Self {
            axes: Axes::Source,
        }
    }

    /// Decode a complete container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is malformed, truncated, uses an
    /// unsupported version or method, or references vertices that do not
    /// exist.
    pub fn decode(&self, bytes: &[u8]) -> DecodeResult<Mesh> {
        let mut reader = Reader::new(bytes);
        let header = Header::read(&mut reader)?;

        let body = match header.method {
            Method::Raw => raw::read_body(&mut reader, &header)?,
            Method::Mg1 => mg1::read_body(&mut reader, &header)?,
            Method::Mg2 => mg2::read_body(&mut reader, &header)?,
        };

        let mesh = body.into_mesh(header.comment)?;
        Ok(match self.axes {
            Axes::Scene => mesh.into_scene_axes(),
            Axes::Source => mesh,
        })
    }

    /// Decode only the header, for inspecting a container cheaply.
    pub fn read_header(bytes: &[u8]) -> DecodeResult<Header> {
        Header::read(&mut Reader::new(bytes))
    }
}

/// Decode a container with the default [`Decoder`].
pub fn decode(bytes: &[u8]) -> DecodeResult<Mesh> {
    Decoder::new().decode(bytes)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;

    use super::*;
    use crate::error::{DecodeError, ErrorCode};
    use crate::header::HAS_NORMALS;

    /// Builder for synthetic `RAW` containers.
    #[derive(Default)]
    struct RawContainer {
        vertices: Vec<[f32; 3]>,
        indices: Vec<[u32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        uv_maps: Vec<(&'static str, Vec<f32>)>,
        attrib_maps: Vec<(&'static str, Vec<f32>)>,
        comment: &'static str,
    }

    impl RawContainer {
        fn encode(&self) -> Vec<u8> {
            let mut out = Vec::new();
            let u32s = |out: &mut Vec<u8>, v: u32| out.extend_from_slice(&v.to_le_bytes());
            let f32s = |out: &mut Vec<u8>, v: f32| out.extend_from_slice(&v.to_le_bytes());
            let string = |out: &mut Vec<u8>, s: &str| {
                out.extend_from_slice(&u32::try_from(s.len()).unwrap().to_le_bytes());
                out.extend_from_slice(s.as_bytes());
            };
            let count = |n: usize| u32::try_from(n).unwrap();

            out.extend_from_slice(b"OCTM");
            u32s(&mut out, 5);
            out.extend_from_slice(b"RAW\0");
            u32s(&mut out, count(self.vertices.len()));
            u32s(&mut out, count(self.indices.len()));
            u32s(&mut out, count(self.uv_maps.len()));
            u32s(&mut out, count(self.attrib_maps.len()));
            u32s(&mut out, if self.normals.is_some() { HAS_NORMALS } else { 0 });
            string(&mut out, self.comment);

            out.extend_from_slice(b"INDX");
            for i in self.indices.iter().flatten() {
                u32s(&mut out, *i);
            }
            out.extend_from_slice(b"VERT");
            for v in self.vertices.iter().flatten() {
                f32s(&mut out, *v);
            }
            if let Some(normals) = &self.normals {
                out.extend_from_slice(b"NORM");
                for n in normals.iter().flatten() {
                    f32s(&mut out, *n);
                }
            }
            for (name, values) in &self.uv_maps {
                out.extend_from_slice(b"TEXC");
                string(&mut out, name);
                string(&mut out, "");
                for v in values {
                    f32s(&mut out, *v);
                }
            }
            for (name, values) in &self.attrib_maps {
                out.extend_from_slice(b"ATTR");
                string(&mut out, name);
                for v in values {
                    f32s(&mut out, *v);
                }
            }
            out
        }
    }

    fn quad() -> RawContainer {
        RawContainer {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            indices: vec![[0, 1, 2], [0, 2, 3]],
            comment: "quad",
            ..RawContainer::default()
        }
    }

    #[test]
    fn test_decode_raw_quad() {
        let mesh = Decoder::source_axes().decode(&quad().encode()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices[2], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.comment, "quad");
        assert_eq!(mesh.axes(), Axes::Source);
        assert!(mesh.normals.is_none());
        assert!(mesh.uvs.is_none());
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn test_decode_applies_axis_fix_up() {
        let container = RawContainer {
            vertices: vec![[1.0, 2.0, 3.0]],
            ..RawContainer::default()
        };
        let mesh = decode(&container.encode()).unwrap();

        assert_eq!(mesh.axes(), Axes::Scene);
        assert_eq!(mesh.vertices, vec![Vec3::new(1.0, -3.0, 2.0)]);
    }

    #[test]
    fn test_decode_optional_chunks() {
        let mut container = quad();
        container.normals = Some(vec![[0.0, 0.0, 1.0]; 4]);
        container.uv_maps = vec![("Diffuse", vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])];
        container.attrib_maps = vec![("Color", vec![1.0; 16])];

        let mesh = Decoder::source_axes().decode(&container.encode()).unwrap();

        assert_eq!(mesh.normals, Some(vec![Vec3::Z; 4]));
        assert_eq!(
            mesh.uvs,
            Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
        );
        assert_eq!(mesh.colors, Some(vec![1.0; 16]));
    }

    #[test]
    fn test_decode_empty_mesh() {
        let mesh = decode(&RawContainer::default().encode()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = quad().encode();
        let err = decode(&bytes[..bytes.len() - 2]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileError);
    }

    #[test]
    fn test_decode_out_of_range_index() {
        let mut container = quad();
        container.indices[1] = [0, 2, 4];
        assert_eq!(
            decode(&container.encode()),
            Err(DecodeError::IndexOutOfBounds { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_decoder_reusable_after_failure() {
        let decoder = Decoder::new();

        let mut bad = quad().encode();
        bad[4] = 9;
        let err = decoder.decode(&bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedFormatVersion);

        let mesh = decoder.decode(&quad().encode()).unwrap();
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_decode_missing_vertex_chunk() {
        let mut bytes = quad().encode();
        let vert = bytes.windows(4).position(|w| w == b"VERT").unwrap();
        bytes[vert..vert + 4].copy_from_slice(b"NORM");
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedChunk {
                expected: "VERT",
                found: *b"NORM"
            }
        );
        assert_eq!(err.code(), ErrorCode::BadFormat);
    }

    #[test]
    fn test_read_header_only() {
        let header = Decoder::read_header(&quad().encode()).unwrap();
        assert_eq!(header.method, Method::Raw);
        assert_eq!(header.vertex_count, 4);
        assert_eq!(header.triangle_count, 2);
    }

    const MG1_QUAD: &[u8] = include_bytes!("../testdata/quad_mg1.ctm");
    const MG2_QUAD: &[u8] = include_bytes!("../testdata/quad_mg2.ctm");

    #[test]
    fn test_decode_mg1_quad() {
        let mesh = Decoder::source_axes().decode(MG1_QUAD).unwrap();

        assert_eq!(mesh.comment, "mg1 quad");
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(
            mesh.vertices,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ]
        );
        assert_eq!(mesh.normals, Some(vec![Vec3::Z; 4]));
        assert_eq!(
            mesh.uvs,
            Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
        );
        assert_eq!(mesh.colors, Some([1.0, 0.5, 0.25, 1.0].repeat(4)));
    }

    #[test]
    fn test_decode_mg2_quad() {
        let mesh = Decoder::source_axes().decode(MG2_QUAD).unwrap();

        assert_eq!(mesh.comment, "mg2 quad");
        // The second triangle starts at a new first index.
        assert_eq!(mesh.faces, vec![[0, 1, 2], [1, 3, 2]]);
        // Two vertices share grid cell 0, the others sit in cells 2 and 3.
        assert_eq!(
            mesh.vertices,
            vec![
                Vec3::new(0.25, 0.25, 0.0),
                Vec3::new(0.75, 0.25, 0.0),
                Vec3::new(0.75, 1.5, 0.0),
                Vec3::new(1.5, 1.5, 0.0),
            ]
        );
        assert_eq!(
            mesh.uvs,
            Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
        );
        assert_eq!(mesh.colors, Some(vec![1.0; 16]));

        // Three normals follow the surface, the last is tilted a quarter
        // turn into the frame's x axis.
        let normals = mesh.normals.unwrap();
        for n in &normals[..3] {
            assert!((*n - Vec3::Z).length() < 1.0e-5, "{n}");
        }
        assert!((normals[3] - Vec3::NEG_Y).length() < 1.0e-5, "{}", normals[3]);
    }

    #[test]
    fn test_decode_mg2_rotates_normals_into_scene_axes() {
        let mesh = decode(MG2_QUAD).unwrap();

        assert_eq!(mesh.axes(), Axes::Scene);
        assert_eq!(mesh.vertices[3], Vec3::new(1.5, 0.0, 1.5));
        let normals = mesh.normals.unwrap();
        assert!((normals[0] - Vec3::NEG_Y).length() < 1.0e-5);
        assert!((normals[3] - Vec3::NEG_Z).length() < 1.0e-5);
    }

    #[test]
    fn test_decode_mg1_truncated_stream() {
        let bytes = &MG1_QUAD[..MG1_QUAD.len() - 8];
        assert!(decode(bytes).is_err());
    }

    proptest! {
        #[test]
        fn prop_decode_preserves_counts(
            vertices in prop::collection::vec(prop::array::uniform3(-1.0e3f32..1.0e3), 1..64),
            seeds in prop::collection::vec(prop::array::uniform3(any::<u32>()), 0..64),
        ) {
            let n = u32::try_from(vertices.len()).unwrap();
            let indices: Vec<[u32; 3]> = seeds.iter().map(|t| t.map(|i| i % n)).collect();
            let container = RawContainer {
                vertices: vertices.clone(),
                indices: indices.clone(),
                ..RawContainer::default()
            };

            let mesh = Decoder::source_axes().decode(&container.encode()).unwrap();

            prop_assert_eq!(mesh.vertex_count(), vertices.len());
            prop_assert_eq!(mesh.face_count(), indices.len());
            prop_assert!(mesh.faces.iter().flatten().all(|&i| i < n));
        }
    }
}
