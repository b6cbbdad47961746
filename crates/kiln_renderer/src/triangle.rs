//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Triangles are two-sided and always use their flat face normal.

use crate::intersection::{Intersection, Object, SurfaceSample};
use crate::sampling::gen_f32;
use crate::Material;
use kiln_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Thickness given to axis-aligned triangles so their boxes can be hit.
const THIN_PAD: f32 = 1e-4;

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edges `v1 - v0` and `v2 - v0`
    e1: Vec3,
    e2: Vec3,
    /// Pre-computed face normal (unit length, zero for degenerate triangles)
    normal: Vec3,
    area: f32,
    bbox: Bounds3,
    material: Arc<Material>,
    /// Position of this triangle inside its mesh
    index: u32,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        let bbox = Self::padded_bounds(Bounds3::new(v0, v1).union_point(v2));

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: cross.length() * 0.5,
            bbox,
            material,
            index: 0,
        }
    }

    /// Tag the triangle with its face index inside a mesh.
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Widen axes of zero extent so that the slab test, which rejects
    /// touching-only intervals, still reports rays crossing the plane.
    fn padded_bounds(bounds: Bounds3) -> Bounds3 {
        let mut padded = bounds;
        let d = bounds.diagonal();
        for axis in 0..3 {
            if d[axis] < THIN_PAD {
                padded.p_min[axis] -= THIN_PAD;
                padded.p_max[axis] += THIN_PAD;
            }
        }
        padded
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Ray parameter and barycentric `(u, v)` of the hit, if any.
    fn moller_trumbore(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let pvec = ray.direction().cross(self.e2);
        let det = self.e1.dot(pvec);

        // Ray is parallel to triangle
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(self.e1);
        let v = ray.direction().dot(qvec) * inv_det;
        if !(0.0..=1.0).contains(&v) || u + v > 1.0 {
            return None;
        }

        let t = self.e2.dot(qvec) * inv_det;
        if t <= 0.0 {
            return None;
        }

        Some((t, Vec2::new(u, v)))
    }
}

impl Object for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<(f32, u32)> {
        self.moller_trumbore(ray).map(|(t, _)| (t, self.index))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        let Some((t, uv)) = self.moller_trumbore(ray) else {
            return Intersection::miss();
        };

        Intersection {
            happened: true,
            coords: ray.at(t),
            normal: self.normal,
            distance: t,
            material: Some(&self.material),
            object: None,
            emit: self.material.emission,
            index: self.index,
            uv,
        }
    }

    fn bounds(&self) -> Bounds3 {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (SurfaceSample, f32) {
        let x = gen_f32(rng).sqrt();
        let y = gen_f32(rng);
        let position = self.v0 * (1.0 - x) + self.v1 * (x * (1.0 - y)) + self.v2 * (x * y);
        let sample = SurfaceSample {
            position,
            normal: self.normal,
            emit: self.material.emission,
        };
        (sample, 1.0 / self.area)
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }
}
