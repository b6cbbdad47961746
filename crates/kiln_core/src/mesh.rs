//! Mesh geometry as handed over by a mesh loader.
//!
//! This module provides a renderer-agnostic triangle mesh: raw vertex
//! positions, per-face vertex index triples and optional per-vertex UVs.
//! It does not parse any file format; loaders fill in the arrays and the
//! renderer turns the result into intersectable triangles.

use kiln_math::{Bounds3, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur when assembling a mesh from raw arrays.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    Empty,

    #[error("Index count {0} is not a multiple of 3")]
    IncompleteFace(usize),

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("UV count {uvs} does not match vertex count {vertices}")]
    UvCountMismatch { uvs: usize, vertices: usize },
}

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// A triangle mesh: vertex positions, optional UVs and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// UV coordinates (optional - one [u, v] per vertex)
    pub uvs: Option<Vec<[f32; 2]>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Bounds3,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> MeshResult<Self> {
        Self::new_with_uvs(positions, indices, None)
    }

    /// Create a new mesh with UV coordinates.
    ///
    /// Fails if the index array does not describe whole, in-range triangles,
    /// or if the UV array is not one entry per vertex.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        uvs: Option<Vec<[f32; 2]>>,
    ) -> MeshResult<Self> {
        if indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteFace(indices.len()));
        }
        if let Some(index) = indices.iter().position(|&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                face: index / 3,
                index: indices[index],
                vertex_count: positions.len(),
            });
        }
        if let Some(uvs) = &uvs {
            if uvs.len() != positions.len() {
                return Err(MeshError::UvCountMismatch {
                    uvs: uvs.len(),
                    vertices: positions.len(),
                });
            }
        }

        let bounds = Self::compute_bounds(&positions);
        log::debug!(
            "Mesh assembled: {} vertices, {} triangles, uvs: {}",
            positions.len(),
            indices.len() / 3,
            uvs.is_some()
        );

        Ok(Self {
            positions,
            uvs,
            indices,
            bounds,
        })
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Bounds3 {
        positions
            .iter()
            .fold(Bounds3::EMPTY, |acc, p| acc.union_point(*p))
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `face`.
    pub fn face(&self, face: usize) -> [usize; 3] {
        let base = face * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Vertex positions of triangle `face`.
    pub fn triangle_vertices(&self, face: usize) -> [Vec3; 3] {
        self.face(face).map(|i| self.positions[i])
    }

    /// Per-vertex UVs of triangle `face`, or zeros when the mesh has none.
    pub fn triangle_uvs(&self, face: usize) -> [Vec2; 3] {
        match &self.uvs {
            Some(uvs) => self.face(face).map(|i| Vec2::from(uvs[i])),
            None => [Vec2::ZERO; 3],
        }
    }

    /// Extract triangle vertices as flat array of [Vec3; 3] triplets.
    pub fn extract_triangle_vertices(&self) -> Vec<[Vec3; 3]> {
        (0..self.triangle_count())
            .map(|face| self.triangle_vertices(face))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0), // v0
            Vec3::new(1.0, 0.0, 0.0), // v1
            Vec3::new(0.0, 1.0, 0.0), // v2
            Vec3::new(1.0, 1.0, 0.0), // v3
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let indices = vec![0, 1, 2];

        let mesh = Mesh::new(positions, indices).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_uvs());
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let indices = vec![0, 1, 2];

        let mesh = Mesh::new(positions, indices).unwrap();

        assert_eq!(mesh.bounds.p_min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.p_max, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(mesh.center(), Vec3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_extract_triangle_vertices() {
        let positions = unit_quad_positions();
        // Two triangles: [0,1,2] and [1,3,2]
        let indices = vec![0, 1, 2, 1, 3, 2];

        let mesh = Mesh::new(positions.clone(), indices).unwrap();
        let triangles = mesh.extract_triangle_vertices();

        assert_eq!(triangles.len(), 2, "Should extract 2 triangles");
        assert_eq!(triangles[0], [positions[0], positions[1], positions[2]]);
        assert_eq!(triangles[1], [positions[1], positions[3], positions[2]]);
    }

    #[test]
    fn test_triangle_uvs() {
        let uvs = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let mesh = Mesh::new_with_uvs(unit_quad_positions(), vec![0, 1, 2, 1, 3, 2], Some(uvs)).unwrap();

        assert!(mesh.has_uvs());
        assert_eq!(
            mesh.triangle_uvs(1),
            [Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)]
        );

        let plain = Mesh::new(unit_quad_positions(), vec![0, 1, 2]).unwrap();
        assert_eq!(plain.triangle_uvs(0), [Vec2::ZERO; 3]);
    }

    #[test]
    fn test_invalid_meshes() {
        assert_eq!(
            Mesh::new(unit_quad_positions(), vec![]).unwrap_err(),
            MeshError::Empty
        );
        assert_eq!(
            Mesh::new(unit_quad_positions(), vec![0, 1]).unwrap_err(),
            MeshError::IncompleteFace(2)
        );
        assert_eq!(
            Mesh::new(unit_quad_positions(), vec![0, 1, 2, 0, 4, 1]).unwrap_err(),
            MeshError::IndexOutOfRange {
                face: 1,
                index: 4,
                vertex_count: 4
            }
        );
        assert_eq!(
            Mesh::new_with_uvs(unit_quad_positions(), vec![0, 1, 2], Some(vec![[0.0, 0.0]])).unwrap_err(),
            MeshError::UvCountMismatch { uvs: 1, vertices: 4 }
        );
    }
}
