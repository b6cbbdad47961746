//! Triangle mesh primitive.
//!
//! Wraps the loader-side [`kiln_core::Mesh`] arrays in intersectable
//! triangles with their own inner BVH. Queries, area and sampling all go
//! through that BVH.

use crate::bvh::Bvh;
use crate::intersection::{Intersection, Object, SurfaceProperties, SurfaceSample};
use crate::{Material, Triangle};
use kiln_core::Mesh;
use kiln_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A triangle mesh sharing one material.
pub struct TriangleMesh {
    bvh: Bvh<Triangle>,
    /// Per-face normals, in triangle index order (the BVH reorders triangles)
    normals: Vec<Vec3>,
    /// Per-face texture coordinates, in triangle index order
    st_coordinates: Vec<[Vec2; 3]>,
    area: f32,
    bounds: Bounds3,
    material: Arc<Material>,
}

impl TriangleMesh {
    /// Build the triangles of `mesh` and their BVH.
    pub fn new(mesh: &Mesh, material: Arc<Material>) -> Self {
        let triangles: Vec<Triangle> = (0..mesh.triangle_count())
            .map(|face| {
                let [v0, v1, v2] = mesh.triangle_vertices(face);
                Triangle::new(v0, v1, v2, Arc::clone(&material)).with_index(face as u32)
            })
            .collect();
        let normals = triangles.iter().map(|t| t.normal()).collect();
        let st_coordinates = (0..mesh.triangle_count())
            .map(|face| mesh.triangle_uvs(face))
            .collect();

        let area = triangles.iter().map(|t| t.area()).sum();
        let bvh = Bvh::new(triangles);
        let bounds = bvh.world_bound();

        log::info!(
            "Triangle mesh: {} triangles, area {:.3}, uvs: {}",
            mesh.triangle_count(),
            area,
            mesh.has_uvs()
        );

        Self {
            bvh,
            normals,
            st_coordinates,
            area,
            bounds,
            material,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn triangle_count(&self) -> usize {
        self.bvh.len()
    }

    /// Face normal of triangle `index` and texture coordinates interpolated
    /// with barycentrics `(1 - u - v, u, v)`.
    pub fn surface_properties(&self, index: u32, uv: Vec2) -> SurfaceProperties {
        let normal = self.normals.get(index as usize).copied().unwrap_or_default();
        let st = match self.st_coordinates.get(index as usize) {
            Some([st0, st1, st2]) => *st0 * (1.0 - uv.x - uv.y) + *st1 * uv.x + *st2 * uv.y,
            None => Vec2::ZERO,
        };
        SurfaceProperties { normal, st }
    }
}

impl Object for TriangleMesh {
    fn intersect(&self, ray: &Ray) -> Option<(f32, u32)> {
        let hit = self.bvh.intersect(ray);
        hit.happened.then_some((hit.distance, hit.index))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    fn bounds(&self) -> Bounds3 {
        self.bounds
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (SurfaceSample, f32) {
        match self.bvh.sample(rng) {
            Some((mut sample, pdf)) => {
                sample.emit = self.material.emission;
                (sample, pdf)
            }
            None => (
                SurfaceSample {
                    position: self.bounds.centroid(),
                    normal: Default::default(),
                    emit: Default::default(),
                },
                0.0,
            ),
        }
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }
}
