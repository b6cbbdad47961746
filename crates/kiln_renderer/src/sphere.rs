//! Sphere primitive for ray tracing.

use crate::intersection::{Intersection, Object, SurfaceSample};
use crate::sampling::uniform_sphere;
use crate::Material;
use kiln_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    radius2: f32,
    area: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        Self {
            center,
            radius,
            radius2: radius * radius,
            area: 4.0 * PI * radius * radius,
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    pub(crate) fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y, phi: angle around Y from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }

    /// Nearest non-negative root of `|o + t d - c|^2 = r^2`.
    fn solve(&self, ray: &Ray) -> Option<f32> {
        let l = ray.origin() - self.center;
        let a = ray.direction().dot(ray.direction());
        let b = 2.0 * ray.direction().dot(l);
        let c = l.dot(l) - self.radius2;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        // Numerically stable form: avoids cancellation when b ~ sqrt(disc)
        let (mut t0, mut t1) = if discriminant == 0.0 {
            let t = -0.5 * b / a;
            (t, t)
        } else {
            let q = if b > 0.0 {
                -0.5 * (b + discriminant.sqrt())
            } else {
                -0.5 * (b - discriminant.sqrt())
            };
            (q / a, c / q)
        };
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 < 0.0 {
            t0 = t1;
        }
        if t0 < 0.0 {
            return None;
        }
        Some(t0)
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<(f32, u32)> {
        self.solve(ray).map(|t| (t, 0))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        let Some(t) = self.solve(ray) else {
            return Intersection::miss();
        };

        let coords = ray.at(t);
        let normal = (coords - self.center).normalize_or_zero();
        Intersection {
            happened: true,
            coords,
            normal,
            distance: t,
            material: Some(&self.material),
            object: None,
            emit: self.material.emission,
            index: 0,
            uv: Self::get_sphere_uv(normal),
        }
    }

    fn bounds(&self) -> Bounds3 {
        let r = Vec3::splat(self.radius);
        Bounds3::new(self.center - r, self.center + r)
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (SurfaceSample, f32) {
        let dir = uniform_sphere(rng);
        let sample = SurfaceSample {
            position: self.center + self.radius * dir,
            normal: dir,
            emit: self.material.emission,
        };
        (sample, 1.0 / self.area)
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Arc::new(Material::default()))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let (t, index) = sphere.intersect(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert_eq!(index, 0);

        let hit = sphere.get_intersection(&ray);
        assert!(hit.happened);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!((hit.coords - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(sphere.intersect(&ray).is_none());
        assert!(!sphere.get_intersection(&ray).happened);

        // Passing beside it
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = sphere.get_intersection(&ray);
        assert!(hit.happened);
        assert!((hit.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_bounds_and_area() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 2.0, Arc::new(Material::default()));
        let b = sphere.bounds();
        assert_eq!(b.p_min, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(b.p_max, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(b.union(&b), b);
        assert!((sphere.area() - 16.0 * PI).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_samples_lie_on_surface() {
        let sphere = Sphere::new(Vec3::new(1.0, -2.0, 0.5), 1.5, Arc::new(Material::default()));
        let bounds = sphere.bounds();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let (s, pdf) = sphere.sample(&mut rng);
            assert!(((s.position - sphere.center()).length() - 1.5).abs() < 1e-4);
            assert!(bounds.inside(s.position));
            assert!((pdf - 1.0 / sphere.area()).abs() < 1e-7);
        }
    }
}
