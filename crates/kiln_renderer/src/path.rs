//! Unidirectional path tracer with next-event estimation.
//!
//! At every diffuse vertex the estimator adds the direct contribution of one
//! point sampled on the scene's emitters, then continues the path in a
//! direction drawn from the material. Paths end by Russian roulette only, so
//! the continuation probability is kept strictly below one.

use crate::integrator::{offset_origin, Integrator};
use crate::intersection::Intersection;
use crate::material::{fresnel, reflect, refract, Material, MaterialKind};
use crate::sampling::{face_forward, gen_f32};
use crate::scene::Traversal;
use crate::{Color, Scene};
use kiln_math::{Ray, Vec3};
use rand::RngCore;

/// Directions with a pdf below this are discarded.
const PDF_EPSILON: f32 = 1e-6;

/// Largest accepted continuation probability. At 1.0 a path inside a closed
/// scene would never end.
pub const MAX_RUSSIAN_ROULETTE: f32 = 0.99;

/// Monte Carlo path tracer.
#[derive(Debug, Clone)]
pub struct PathIntegrator {
    russian_roulette: f32,
    /// Distance secondary rays are pushed off the surface
    pub epsilon: f32,
    pub traversal: Traversal,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self {
            russian_roulette: 0.8,
            epsilon: 1e-3,
            traversal: Traversal::Bvh,
        }
    }
}

/// Where a path goes after a vertex.
struct Bounce {
    ray: Ray,
    /// Throughput factor of this vertex
    weight: Color,
    /// Whether emission hit by `ray` is counted directly
    specular: bool,
}

impl PathIntegrator {
    /// Path tracer continuing with probability `russian_roulette`, clamped
    /// to `[0, MAX_RUSSIAN_ROULETTE]`. NaN becomes 0 (direct light only).
    pub fn new(russian_roulette: f32) -> Self {
        let clamped = if russian_roulette.is_nan() {
            0.0
        } else {
            russian_roulette.clamp(0.0, MAX_RUSSIAN_ROULETTE)
        };
        if clamped != russian_roulette {
            log::warn!(
                "Russian roulette probability {} clamped to {}",
                russian_roulette,
                clamped
            );
        }
        Self {
            russian_roulette: clamped,
            ..Default::default()
        }
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Continuation probability in use.
    pub fn russian_roulette(&self) -> f32 {
        self.russian_roulette
    }

    /// Radiance along `ray`. `count_emission` is set for camera rays; rays
    /// leaving a specular surface count emission too, since next-event
    /// estimation cannot reach through a mirror.
    fn trace(&self, scene: &Scene, ray: &Ray, count_emission: bool, rng: &mut dyn RngCore) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = *ray;
        let mut count_emission = count_emission;

        loop {
            let hit = scene.query(&ray, self.traversal);
            let Some(material) = hit.material else {
                break;
            };

            if material.has_emission() {
                if count_emission {
                    radiance += throughput * material.emission;
                }
                break;
            }

            let bounce = match material.kind {
                MaterialKind::Diffuse => {
                    radiance += throughput * self.direct_light(scene, &ray, &hit, material, rng);
                    self.continue_diffuse(&ray, &hit, material, rng)
                }
                MaterialKind::Reflective | MaterialKind::ReflectiveRefractive => {
                    self.continue_specular(&ray, &hit, material, rng)
                }
            };
            let Some(bounce) = bounce else {
                break;
            };

            throughput *= bounce.weight;
            if throughput == Color::ZERO {
                break;
            }
            ray = bounce.ray;
            count_emission = bounce.specular;
        }

        radiance
    }

    /// One light sample towards the scene's emitters.
    fn direct_light(
        &self,
        scene: &Scene,
        ray: &Ray,
        hit: &Intersection<'_>,
        material: &Material,
        rng: &mut dyn RngCore,
    ) -> Color {
        let p = hit.coords;
        let wi = ray.direction();
        let n = face_forward(hit.normal, wi);

        let Some((light, pdf_light)) = scene.sample_light(rng) else {
            return Color::ZERO;
        };
        let origin = offset_origin(p, n, light.position - p, self.epsilon);
        let to_light = light.position - origin;
        let distance2 = to_light.length_squared();
        if distance2 <= 0.0 || pdf_light <= 0.0 {
            return Color::ZERO;
        }
        let distance = distance2.sqrt();
        let ws = to_light / distance;

        let shadow = scene.query(&Ray::new(origin, ws), self.traversal);
        let tolerance = (1e-3 * distance).max(self.epsilon);
        if shadow.happened && shadow.distance < distance - tolerance {
            return Color::ZERO;
        }

        // Emitters are two-sided
        let cos_surface = ws.dot(n).max(0.0);
        let cos_light = ws.dot(light.normal).abs();
        light.emit * material.eval(wi, ws, n) * cos_surface * cos_light / distance2 / pdf_light
    }

    fn continue_diffuse(
        &self,
        ray: &Ray,
        hit: &Intersection<'_>,
        material: &Material,
        rng: &mut dyn RngCore,
    ) -> Option<Bounce> {
        if gen_f32(rng) >= self.russian_roulette {
            return None;
        }

        let p = hit.coords;
        let wi = ray.direction();
        let n = face_forward(hit.normal, wi);
        let wo = material.sample(wi, n, rng).normalize_or_zero();
        let pdf = material.pdf(wi, wo, n);
        if pdf <= PDF_EPSILON {
            return None;
        }

        Some(Bounce {
            ray: Ray::new(offset_origin(p, n, wo, self.epsilon), wo),
            weight: material.eval(wi, wo, n) * wo.dot(n) / pdf / self.russian_roulette,
            specular: false,
        })
    }

    fn continue_specular(
        &self,
        ray: &Ray,
        hit: &Intersection<'_>,
        material: &Material,
        rng: &mut dyn RngCore,
    ) -> Option<Bounce> {
        if gen_f32(rng) >= self.russian_roulette {
            return None;
        }

        let p = hit.coords;
        let dir = ray.direction();
        let n = hit.normal;
        let kr = fresnel(dir, n, material.ior);

        let (wo, weight) = match material.kind {
            MaterialKind::Reflective => (reflect(dir, n), kr),
            // Pick one branch with probability kr; the weight cancels
            _ if gen_f32(rng) < kr => (reflect(dir, n), 1.0),
            _ => (refract(dir, n, material.ior), 1.0),
        };
        let wo = wo.normalize_or_zero();
        if wo == Vec3::ZERO {
            return None;
        }

        Some(Bounce {
            ray: Ray::new(offset_origin(p, n, wo, self.epsilon), wo),
            weight: Color::splat(weight / self.russian_roulette),
            specular: true,
        })
    }
}

impl Integrator for PathIntegrator {
    fn cast_ray(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.trace(scene, ray, depth == 0, rng)
    }
}
