//! Decode OpenCTM triangle mesh containers.
//!
//! This crate provides a pure synchronous decoder for the OpenCTM v5 format
//! in all three of its compression methods (`RAW`, `MG1`, `MG2`). The caller
//! supplies the whole container as a byte slice and receives an owned
//! [`Mesh`]; nothing is retained between calls.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Tolerant of optional data**: Missing normals, UV or color maps are
//!   `None`, never errors
//! - **Strict about geometry**: Out-of-range indices and non-finite
//!   positions are rejected
//!
//! # Example
//!
//! ```ignore
//! use ctm_decode::Decoder;
//!
//! let bytes = std::fs::read("model.ctm")?;
//! let mesh = Decoder::new().decode(&bytes)?;
//! println!("{} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
//! ```

mod body;
mod decoder;
mod error;
mod header;
mod indices;
mod lzma;
mod mesh;
mod mg1;
mod mg2;
mod normals;
mod packed;
mod raw;
mod reader;

pub use body::COLOR_MAP;
pub use decoder::{Decoder, decode};
pub use error::{DecodeError, DecodeResult, ErrorCode};
pub use header::{FORMAT_VERSION, HAS_NORMALS, Header, Method};
pub use mesh::{Axes, Mesh, source_to_scene};

// Re-export the vector type used in `Mesh` for convenience.
pub use glam::Vec3;
