//! `MG1` body: LZMA-packed arrays with delta-coded indices.

use crate::body::{Body, FloatMap, elements, group3};
use crate::error::DecodeResult;
use crate::header::Header;
use crate::indices::restore_indices;
use crate::packed::{read_packed_f32, read_packed_u32};
use crate::reader::Reader;

pub(crate) fn read_body(reader: &mut Reader<'_>, header: &Header) -> DecodeResult<Body> {
    let vertex_count = header.vertex_count;

    reader.expect_tag("INDX")?;
    let mut indices = read_packed_u32(reader, header.triangle_count, 3, "indices")?;
    restore_indices(&mut indices);

    // Vertices are packed as one flat component, not as triples.
    reader.expect_tag("VERT")?;
    let flat = read_packed_f32(reader, elements(vertex_count, 3, "vertices")?, 1, "vertices")?;
    let vertices = group3(&flat);

    let normals = if header.has_normals() {
        reader.expect_tag("NORM")?;
        Some(group3(&read_packed_f32(reader, vertex_count, 3, "normals")?))
    } else {
        None
    };

    let mut uv_maps = Vec::new();
    for _ in 0..header.uv_map_count {
        reader.expect_tag("TEXC")?;
        let name = reader.read_string("uv map name")?;
        let _file_name = reader.read_string("uv map file name")?;
        let values = read_packed_f32(reader, vertex_count, 2, "uv map")?;
        uv_maps.push(FloatMap { name, values });
    }

    let mut attrib_maps = Vec::new();
    for _ in 0..header.attrib_map_count {
        reader.expect_tag("ATTR")?;
        let name = reader.read_string("attribute map name")?;
        let values = read_packed_f32(reader, vertex_count, 4, "attribute map")?;
        attrib_maps.push(FloatMap { name, values });
    }

    Ok(Body {
        vertices,
        indices,
        normals,
        uv_maps,
        attrib_maps,
    })
}
