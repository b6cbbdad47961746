//! Whitted-style recursive ray tracer.
//!
//! Specular surfaces spawn reflection (and refraction) rays up to a fixed
//! depth; diffuse surfaces are shaded with a Lambert + Phong model from the
//! scene's point lights. Area lights, and emissive primitives, do not
//! contribute to direct lighting here.

use crate::integrator::{offset_origin, Integrator};
use crate::light::Light;
use crate::material::{fresnel, reflect, refract, MaterialKind};
use crate::scene::Traversal;
use crate::{Color, Scene};
use kiln_math::Ray;
use rand::RngCore;

/// Recursive specular tracer with point-light shading.
#[derive(Debug, Clone)]
pub struct WhittedIntegrator {
    /// Rays deeper than this return black
    pub max_depth: u32,
    /// Radiance of rays that escape the scene
    pub background: Color,
    /// Distance secondary rays are pushed off the surface
    pub epsilon: f32,
    pub traversal: Traversal,
}

impl Default for WhittedIntegrator {
    fn default() -> Self {
        Self {
            max_depth: 5,
            background: Color::new(0.235294, 0.67451, 0.843137),
            epsilon: 1e-4,
            traversal: Traversal::Bvh,
        }
    }
}

impl WhittedIntegrator {
    pub fn new(max_depth: u32, background: Color) -> Self {
        Self {
            max_depth,
            background,
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
}

impl Integrator for WhittedIntegrator {
    fn cast_ray(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth > self.max_depth {
            return Color::ZERO;
        }

        let hit = scene.query(ray, self.traversal);
        let (Some(object), Some(material)) = (hit.object, hit.material) else {
            return self.background;
        };

        let p = hit.coords;
        let props = object.surface_properties(p, hit.index, hit.uv);
        let n = props.normal;
        let dir = ray.direction();

        match material.kind {
            MaterialKind::ReflectiveRefractive => {
                let reflection_dir = reflect(dir, n).normalize_or_zero();
                let refraction_dir = refract(dir, n, material.ior).normalize_or_zero();

                let reflection_ray =
                    Ray::new(offset_origin(p, n, reflection_dir, self.epsilon), reflection_dir);
                let reflection_color = self.cast_ray(scene, &reflection_ray, depth + 1, rng);

                // Zero direction means total internal reflection
                let refraction_color = if refraction_dir == kiln_math::Vec3::ZERO {
                    Color::ZERO
                } else {
                    let refraction_ray = Ray::new(
                        offset_origin(p, n, refraction_dir, self.epsilon),
                        refraction_dir,
                    );
                    self.cast_ray(scene, &refraction_ray, depth + 1, rng)
                };

                let kr = fresnel(dir, n, material.ior);
                reflection_color * kr + refraction_color * (1.0 - kr)
            }
            MaterialKind::Reflective => {
                let kr = fresnel(dir, n, material.ior);
                let reflection_dir = reflect(dir, n).normalize_or_zero();
                let reflection_ray =
                    Ray::new(offset_origin(p, n, reflection_dir, self.epsilon), reflection_dir);
                self.cast_ray(scene, &reflection_ray, depth + 1, rng) * kr
            }
            MaterialKind::Diffuse => {
                let mut light_amount = Color::ZERO;
                let mut specular = Color::ZERO;
                // Shadow rays start on the side the viewing ray arrived from
                let shadow_origin = offset_origin(p, n, -dir, self.epsilon);

                for light in scene.lights() {
                    // Area lights are not sampled by this estimator
                    let Light::Point(light) = light else {
                        continue;
                    };

                    let to_light = light.position - p;
                    let distance2 = to_light.length_squared();
                    let light_dir = to_light.normalize_or_zero();

                    let shadow = scene.query(&Ray::new(shadow_origin, light_dir), self.traversal);
                    let in_shadow = shadow.happened && shadow.distance * shadow.distance < distance2;
                    if in_shadow {
                        continue;
                    }

                    light_amount += light.intensity * light_dir.dot(n).max(0.0);
                    let reflection_dir = reflect(-light_dir, n);
                    specular += (-reflection_dir.dot(dir))
                        .max(0.0)
                        .powf(material.specular_exponent)
                        * light.intensity;
                }

                light_amount * object.eval_diffuse_color(props.st) * material.kd
                    + specular * material.ks
            }
        }
    }
}
