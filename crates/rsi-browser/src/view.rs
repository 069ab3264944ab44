//! Plain-text rendering of catalog data.

use std::fmt::Write;

use ctm_decode::{Mesh, Vec3};
use rsi::{DetailRecord, SearchSummary};

const MISSING: &str = "-";

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// One line per search hit.
#[must_use]
pub fn results(results: &[SearchSummary]) -> String {
    if results.is_empty() {
        return "no ships found\n".to_string();
    }

    let width = results.iter().map(|r| r.id.as_str().len()).max().unwrap_or(0);
    let mut out = String::new();
    for (index, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "#{:<3} {:>width$}  {}",
            index + 1,
            result.id.as_str(),
            result.name
        );
    }
    out
}

/// The ship detail sheet.
#[must_use]
pub fn detail(record: &DetailRecord, website: Option<&str>) -> String {
    let rows = [
        ("Name", record.name.clone()),
        ("Id", record.id.to_string()),
        ("Manufacturer", or_missing(record.manufacturer.as_deref()).to_string()),
        ("Type", or_missing(record.role.as_deref()).to_string()),
        ("Focus", or_missing(record.focus.as_deref()).to_string()),
        ("Size", or_missing(record.size.as_deref()).to_string()),
        (
            "H/L/B (m)",
            format!(
                "{}/{}/{}",
                number(record.dimensions.height),
                number(record.dimensions.length),
                number(record.dimensions.beam)
            ),
        ),
        (
            "Crew",
            format!("{} - {}", count(record.crew.min), count(record.crew.max)),
        ),
        (
            "Model",
            if record.has_model() { "available" } else { "none" }.to_string(),
        ),
        ("Website", or_missing(website).to_string()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<13} {value}");
    }
    out
}

fn vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Summary of a decoded mesh.
#[must_use]
pub fn mesh(mesh: &Mesh) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "vertices  {}", mesh.vertex_count());
    let _ = writeln!(out, "faces     {}", mesh.face_count());
    let _ = writeln!(out, "axes      {:?}", mesh.axes());

    let mut channels = Vec::new();
    if mesh.normals.is_some() {
        channels.push("normals");
    }
    if mesh.uvs.is_some() {
        channels.push("uv");
    }
    if mesh.colors.is_some() {
        channels.push("color");
    }
    let channels = if channels.is_empty() {
        MISSING.to_string()
    } else {
        channels.join(", ")
    };
    let _ = writeln!(out, "channels  {channels}");

    if let Some((min, max)) = mesh.bounds() {
        let _ = writeln!(out, "bounds    {} .. {}", vec3(min), vec3(max));
        let _ = writeln!(out, "size      {}", vec3(mesh.size()));
    }
    if !mesh.comment.is_empty() {
        let _ = writeln!(out, "comment   {}", mesh.comment);
    }
    out
}
