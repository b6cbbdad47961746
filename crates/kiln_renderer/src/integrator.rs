//! Radiance estimators.
//!
//! An [`Integrator`] turns a ray into the radiance arriving along it. Two
//! estimators are provided and one is picked per render, never per ray:
//! [`WhittedIntegrator`](crate::WhittedIntegrator) for recursive specular
//! tracing with point-light shading and
//! [`PathIntegrator`](crate::PathIntegrator) for Monte Carlo path tracing.

use crate::{Color, Scene};
use kiln_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Computes the radiance carried by a ray.
pub trait Integrator: Send + Sync {
    /// Radiance arriving at the ray origin from direction `-ray.direction`.
    ///
    /// `depth` is the number of bounces that produced this ray (0 for camera
    /// rays). Implementations must terminate on every input.
    fn cast_ray(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color;
}

/// Which estimator a render uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    Whitted,
    #[default]
    Path,
}

/// Move `p` off the surface with normal `n`, onto the side that `dir` points to.
#[inline]
pub fn offset_origin(p: Vec3, n: Vec3, dir: Vec3, epsilon: f32) -> Vec3 {
    if dir.dot(n) < 0.0 {
        p - n * epsilon
    } else {
        p + n * epsilon
    }
}
