//! Uncompressed (`RAW`) body.

use crate::body::{Body, FloatMap, elements, group3};
use crate::error::DecodeResult;
use crate::header::Header;
use crate::reader::Reader;

pub(crate) fn read_body(reader: &mut Reader<'_>, header: &Header) -> DecodeResult<Body> {
    let vertex_count = header.vertex_count;

    reader.expect_tag("INDX")?;
    let indices =
        reader.read_u32_array(elements(header.triangle_count, 3, "indices")?, "indices")?;

    reader.expect_tag("VERT")?;
    let vertices =
        group3(&reader.read_f32_array(elements(vertex_count, 3, "vertices")?, "vertices")?);

    let normals = if header.has_normals() {
        reader.expect_tag("NORM")?;
        let flat = reader.read_f32_array(elements(vertex_count, 3, "normals")?, "normals")?;
        Some(group3(&flat))
    } else {
        None
    };

    let mut uv_maps = Vec::new();
    for _ in 0..header.uv_map_count {
        reader.expect_tag("TEXC")?;
        let name = reader.read_string("uv map name")?;
        let _file_name = reader.read_string("uv map file name")?;
        let values = reader.read_f32_array(elements(vertex_count, 2, "uv map")?, "uv map")?;
        uv_maps.push(FloatMap { name, values });
    }

    let mut attrib_maps = Vec::new();
    for _ in 0..header.attrib_map_count {
        reader.expect_tag("ATTR")?;
        let name = reader.read_string("attribute map name")?;
        let values = reader
            .read_f32_array(elements(vertex_count, 4, "attribute map")?, "attribute map")?;
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
