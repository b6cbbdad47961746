//! Random sampling helpers shared by primitives, materials and integrators.
//!
//! Every routine takes the random source explicitly so renders are
//! reproducible from a seed and parallel workers never share state.

use kiln_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniformly distributed direction on the +Z hemisphere (local frame).
pub fn uniform_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = (1.0 - 2.0 * gen_f32(rng)).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Rotate a local direction (Z up) into the frame around normal `n`.
///
/// The tangent is built from whichever of `n.x`/`n.y` is larger in magnitude,
/// which keeps it away from a degenerate cross product.
pub fn to_world(local: Vec3, n: Vec3) -> Vec3 {
    let c = if n.x.abs() > n.y.abs() {
        let inv_len = 1.0 / (n.x * n.x + n.z * n.z).sqrt();
        Vec3::new(n.z * inv_len, 0.0, -n.x * inv_len)
    } else {
        let inv_len = 1.0 / (n.y * n.y + n.z * n.z).sqrt();
        Vec3::new(0.0, n.z * inv_len, -n.y * inv_len)
    };
    let b = c.cross(n);
    local.x * b + local.y * c + local.z * n
}

/// Flip `n` so it faces against `direction`.
#[inline]
pub fn face_forward(n: Vec3, direction: Vec3) -> Vec3 {
    if direction.dot(n) > 0.0 {
        -n
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_sphere_is_unit_and_balanced() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut mean = Vec3::ZERO;
        for _ in 0..10_000 {
            let d = uniform_sphere(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            mean += d;
        }
        mean /= 10_000.0;
        assert!(mean.length() < 0.05, "mean direction {:?}", mean);
    }

    #[test]
    fn test_hemisphere_in_world_frame() {
        let mut rng = StdRng::seed_from_u64(2);
        let normals = [
            Vec3::X,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::new(1.0, 1.0, 1.0).normalize(),
            Vec3::new(-0.2, 0.1, -0.97).normalize(),
        ];
        for n in normals {
            for _ in 0..500 {
                let d = to_world(uniform_hemisphere(&mut rng), n);
                assert!((d.length() - 1.0).abs() < 1e-4);
                assert!(d.dot(n) >= -1e-5);
            }
        }
    }

    #[test]
    fn test_to_world_maps_z_to_normal() {
        let n = Vec3::new(0.3, -0.4, 0.5).normalize();
        assert!((to_world(Vec3::Z, n) - n).length() < 1e-5);
    }

    #[test]
    fn test_face_forward() {
        assert_eq!(face_forward(Vec3::Y, Vec3::NEG_Y), Vec3::Y);
        assert_eq!(face_forward(Vec3::Y, Vec3::Y), Vec3::NEG_Y);
    }
}
