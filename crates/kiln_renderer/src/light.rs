//! Explicit light sources.
//!
//! Emissive primitives act as area lights on their own and are found by the
//! scene through [`Object::has_emit`](crate::Object::has_emit). The lights in
//! this module are the ones listed separately in the scene: point lights for
//! the Whitted estimator and rectangular area lights, which the path tracer
//! samples next to the emissive primitives. Area lights are not visible to
//! rays.

use crate::intersection::SurfaceSample;
use crate::sampling::gen_f32;
use crate::Color;
use kiln_math::Vec3;
use rand::RngCore;

/// An infinitesimal light at `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// A parallelogram light spanned by `u` and `v` from its corner `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub position: Vec3,
    pub intensity: Color,
    pub u: Vec3,
    pub v: Vec3,
    pub normal: Vec3,
    /// Side length before scaling `u` and `v`
    pub length: f32,
}

impl AreaLight {
    /// Square light of side `length` in the plane spanned by `u` and `v`.
    pub fn new(position: Vec3, intensity: Color, u: Vec3, v: Vec3, length: f32) -> Self {
        Self {
            position,
            intensity,
            u: u * length,
            v: v * length,
            normal: u.cross(v).normalize_or_zero(),
            length,
        }
    }

    /// Uniform point on the light's surface.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let r1 = gen_f32(rng);
        let r2 = gen_f32(rng);
        self.position + r1 * self.u + r2 * self.v
    }

    /// Uniform point with the light's normal and radiance.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        SurfaceSample {
            position: self.sample_point(rng),
            normal: self.normal,
            emit: self.intensity,
        }
    }

    pub fn area(&self) -> f32 {
        self.u.cross(self.v).length()
    }
}

/// A light listed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    pub fn intensity(&self) -> Color {
        match self {
            Light::Point(l) => l.intensity,
            Light::Area(l) => l.intensity,
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Self {
        Light::Area(light)
    }
}
