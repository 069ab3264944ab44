//! Wavefront OBJ export of decoded meshes.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ctm_decode::Mesh;

/// Write `mesh` as a single OBJ object named `name`.
///
/// Normals and the first UV channel are written when present. Face indices
/// are 1-based as the format requires.
pub fn write_obj<W: Write>(mesh: &Mesh, name: &str, out: &mut W) -> io::Result<()> {
    if !mesh.comment.is_empty() {
        for line in mesh.comment.lines() {
            writeln!(out, "# {line}")?;
        }
    }
    writeln!(out, "o {name}")?;

    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }
    if let Some(uvs) = &mesh.uvs {
        for uv in uvs.chunks_exact(2) {
            writeln!(out, "vt {} {}", uv[0], uv[1])?;
        }
    }
    if let Some(normals) = &mesh.normals {
        for n in normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    let has_uvs = mesh.uvs.is_some();
    let has_normals = mesh.normals.is_some();
    for face in &mesh.faces {
        write!(out, "f")?;
        for index in face {
            let i = u64::from(*index) + 1;
            match (has_uvs, has_normals) {
                (false, false) => write!(out, " {i}")?,
                (true, false) => write!(out, " {i}/{i}")?,
                (false, true) => write!(out, " {i}//{i}")?,
                (true, true) => write!(out, " {i}/{i}/{i}")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write `mesh` to an OBJ file, creating parent directories as needed.
pub fn export_obj(mesh: &Mesh, name: &str, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(mesh, name, &mut out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctm_decode::Vec3;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::default();
        mesh.vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.5, 0.0),
        ];
        mesh.faces = vec![[0, 1, 2]];
        mesh
    }

    fn render(mesh: &Mesh) -> String {
        let mut out = Vec::new();
        write_obj(mesh, "ship", &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_positions_only() {
        assert_eq!(
            render(&triangle()),
            "o ship\nv 0 0 0\nv 1 0 0\nv 0 1.5 0\nf 1 2 3\n"
        );
    }

    #[test]
    fn test_all_channels() {
        let mut mesh = triangle();
        mesh.comment = "made by hand".into();
        mesh.uvs = Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        mesh.normals = Some(vec![Vec3::Z; 3]);

        let text = render(&mesh);
        assert!(text.starts_with("# made by hand\no ship\n"));
        assert!(text.contains("vt 1 0\n"));
        assert!(text.contains("vn 0 0 1\n"));
        assert!(text.ends_with("f 1/1/1 2/2/2 3/3/3\n"));
    }

    #[test]
    fn test_normals_without_uvs() {
        let mut mesh = triangle();
        mesh.normals = Some(vec![Vec3::Z; 3]);
        assert!(render(&mesh).ends_with("f 1//1 2//2 3//3\n"));
    }

    #[test]
    fn test_export_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/ship.obj");
        export_obj(&triangle(), "ship", &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("o ship\n"));
    }
}
