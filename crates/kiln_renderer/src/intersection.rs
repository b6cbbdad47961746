//! Intersection record and the capability set shared by every primitive.

use crate::{Color, Material, Primitive};
use kiln_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;

/// Result of a ray-scene query.
///
/// A miss is an ordinary value: `happened == false` and `distance == INFINITY`,
/// so the nearest of two records can always be picked by comparing distances.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Whether the ray hit anything
    pub happened: bool,
    /// Hit point in world space
    pub coords: Vec3,
    /// Geometric normal at the hit point (outward, not face-forwarded)
    pub normal: Vec3,
    /// Ray parameter of the hit
    pub distance: f32,
    /// Material of the hit surface
    pub material: Option<&'a Material>,
    /// The top-level primitive that was hit
    pub object: Option<&'a Primitive>,
    /// Emission of the hit surface
    pub emit: Color,
    /// Triangle index inside a mesh (0 for single-shape primitives)
    pub index: u32,
    /// Barycentric coordinates for triangles, zero otherwise
    pub uv: Vec2,
}

impl<'a> Intersection<'a> {
    /// A record that reports no hit.
    pub fn miss() -> Self {
        Self {
            happened: false,
            coords: Vec3::ZERO,
            normal: Vec3::ZERO,
            distance: f32::INFINITY,
            material: None,
            object: None,
            emit: Color::ZERO,
            index: 0,
            uv: Vec2::ZERO,
        }
    }

    /// Keep whichever of the two records is closer.
    #[inline]
    pub fn nearest(self, other: Self) -> Self {
        if other.distance < self.distance {
            other
        } else {
            self
        }
    }
}

impl<'a> Default for Intersection<'a> {
    fn default() -> Self {
        Self::miss()
    }
}

impl std::fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intersection")
            .field("happened", &self.happened)
            .field("coords", &self.coords)
            .field("normal", &self.normal)
            .field("distance", &self.distance)
            .field("index", &self.index)
            .finish()
    }
}

/// A uniformly drawn point on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
    /// Emission of the sampled surface
    pub emit: Color,
}

/// Shading inputs at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProperties {
    pub normal: Vec3,
    /// Texture coordinates
    pub st: Vec2,
}

/// Capability set every intersectable shape provides.
pub trait Object: Send + Sync {
    /// Nearest positive ray parameter and local triangle index, without
    /// building a full record.
    fn intersect(&self, ray: &Ray) -> Option<(f32, u32)>;

    /// Full intersection record. Agrees with [`Object::intersect`].
    fn get_intersection(&self, ray: &Ray) -> Intersection<'_>;

    /// Tight axis-aligned bounds.
    fn bounds(&self) -> Bounds3;

    /// Surface area, cached at construction.
    fn area(&self) -> f32;

    /// Uniform point on the surface with its area-measure pdf (`1 / area`).
    fn sample(&self, rng: &mut dyn RngCore) -> (SurfaceSample, f32);

    /// Whether the surface emits light.
    fn has_emit(&self) -> bool;
}
