//! `MG2` body: quantized geometry on a spatial grid.
//!
//! Vertices are stored as integer offsets from the origin of the grid cell
//! they fall in. Cells are visited in ascending order, so the cell index
//! stream is delta-coded, and within a cell the X offset is delta-coded
//! against the previous vertex.

use glam::Vec3;

use crate::body::{Body, FloatMap, check_indices};
use crate::error::{DecodeError, DecodeResult};
use crate::header::Header;
use crate::indices::restore_indices;
use crate::normals::restore_normals;
use crate::packed::{read_packed_i32, read_packed_u32};
use crate::reader::Reader;

/// Axis-aligned grid the vertices were quantized against.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Grid {
    min: Vec3,
    division: [u32; 3],
    cell: Vec3,
}

impl Grid {
    pub(crate) fn new(min: Vec3, max: Vec3, division: [u32; 3]) -> DecodeResult<Self> {
        if division.contains(&0) {
            return Err(DecodeError::InvalidFormat {
                context: "grid",
                detail: format!("zero division {division:?}"),
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let cell = (max - min) / Vec3::new(division[0] as f32, division[1] as f32, division[2] as f32);
        Ok(Self {
            min,
            division,
            cell,
        })
    }

    fn read(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let mut min = [0.0; 3];
        for v in &mut min {
            *v = reader.read_f32("grid min")?;
        }
        let mut max = [0.0; 3];
        for v in &mut max {
            *v = reader.read_f32("grid max")?;
        }
        let mut division = [0u32; 3];
        for v in &mut division {
            *v = reader.read_u32("grid division")?;
        }
        Self::new(Vec3::from_array(min), Vec3::from_array(max), division)
    }

    /// Origin of cell `index`, where cells are numbered X fastest, then Y,
    /// then Z.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn cell_origin(&self, index: u32) -> Vec3 {
        let index = u64::from(index);
        let ydiv = u64::from(self.division[0]);
        let zdiv = ydiv * u64::from(self.division[1]);

        let gz = index / zdiv;
        let rem = index - gz * zdiv;
        let gy = rem / ydiv;
        let gx = rem - gy * ydiv;

        Vec3::new(gx as f32, gy as f32, gz as f32) * self.cell + self.min
    }
}

pub(crate) fn read_body(reader: &mut Reader<'_>, header: &Header) -> DecodeResult<Body> {
    let vertex_count = header.vertex_count;

    reader.expect_tag("MG2H")?;
    let vertex_precision = read_precision(reader, "vertex precision")?;
    let normal_precision = read_precision(reader, "normal precision")?;
    let grid = Grid::read(reader)?;

    reader.expect_tag("VERT")?;
    let int_vertices = read_packed_u32(reader, vertex_count, 3, "vertices")?;

    reader.expect_tag("GIDX")?;
    let mut grid_indices = read_packed_u32(reader, vertex_count, 1, "grid indices")?;
    for i in 1..grid_indices.len() {
        grid_indices[i] = grid_indices[i].wrapping_add(grid_indices[i - 1]);
    }

    let vertices = restore_vertices(&int_vertices, &grid_indices, &grid, vertex_precision);

    reader.expect_tag("INDX")?;
    let mut indices = read_packed_u32(reader, header.triangle_count, 3, "indices")?;
    restore_indices(&mut indices);
    // Normal reconstruction walks the triangles, so bounds must hold first.
    check_indices(&indices, vertex_count)?;

    let normals = if header.has_normals() {
        reader.expect_tag("NORM")?;
        let packed = read_packed_u32(reader, vertex_count, 3, "normals")?;
        Some(restore_normals(
            &packed,
            &vertices,
            &indices,
            normal_precision,
        ))
    } else {
        None
    };

    let mut uv_maps = Vec::new();
    for _ in 0..header.uv_map_count {
        reader.expect_tag("TEXC")?;
        let name = reader.read_string("uv map name")?;
        let _file_name = reader.read_string("uv map file name")?;
        let precision = read_precision(reader, "uv map precision")?;
        let ints = read_packed_i32(reader, vertex_count, 2, "uv map")?;
        uv_maps.push(FloatMap {
            name,
            values: restore_map(&ints, 2, precision),
        });
    }

    let mut attrib_maps = Vec::new();
    for _ in 0..header.attrib_map_count {
        reader.expect_tag("ATTR")?;
        let name = reader.read_string("attribute map name")?;
        let precision = read_precision(reader, "attribute map precision")?;
        let ints = read_packed_i32(reader, vertex_count, 4, "attribute map")?;
        attrib_maps.push(FloatMap {
            name,
            values: restore_map(&ints, 4, precision),
        });
    }

    Ok(Body {
        vertices,
        indices,
        normals,
        uv_maps,
        attrib_maps,
    })
}

fn read_precision(reader: &mut Reader<'_>, context: &'static str) -> DecodeResult<f32> {
    let precision = reader.read_f32(context)?;
    if precision.is_finite() && precision > 0.0 {
        Ok(precision)
    } else {
        Err(DecodeError::InvalidFormat {
            context,
            detail: format!("precision must be positive, got {precision}"),
        })
    }
}

/// Rebuild positions from cell-relative integer offsets.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub(crate) fn restore_vertices(
    int_vertices: &[u32],
    grid_indices: &[u32],
    grid: &Grid,
    precision: f32,
) -> Vec<Vec3> {
    let mut prev_cell = None;
    let mut prev_dx: i32 = 0;

    int_vertices
        .chunks_exact(3)
        .zip(grid_indices)
        .map(|(v, &cell)| {
            let origin = grid.cell_origin(cell);

            let mut dx = v[0] as i32;
            if prev_cell == Some(cell) {
                dx = dx.wrapping_add(prev_dx);
            }
            prev_cell = Some(cell);
            prev_dx = dx;

            Vec3::new(
                precision * dx as f32 + origin.x,
                precision * v[1] as f32 + origin.y,
                precision * v[2] as f32 + origin.z,
            )
        })
        .collect()
}

/// Undo per-component delta prediction and scale to floats.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn restore_map(ints: &[i32], size: usize, precision: f32) -> Vec<f32> {
    let mut prev = vec![0i32; size];
    let mut values = Vec::with_capacity(ints.len());
    for element in ints.chunks_exact(size) {
        for (k, &delta) in element.iter().enumerate() {
            let value = delta.wrapping_add(prev[k]);
            values.push(value as f32 * precision);
            prev[k] = value;
        }
    }
    values
}
