//! Kiln Core - geometry data shared between loaders and the renderer.
//!
//! This crate provides:
//!
//! - **Mesh**: raw vertex positions, triangle indices and per-vertex UVs,
//!   validated on construction
//!
//! # Example
//!
//! ```
//! use kiln_core::Mesh;
//! use kiln_math::Vec3;
//!
//! let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])?;
//! assert_eq!(mesh.triangle_count(), 1);
//! # Ok::<(), kiln_core::MeshError>(())
//! ```

pub mod mesh;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, MeshResult};
