//! Surface shading model.
//!
//! A [`Material`] is a plain value shared read-only between primitives
//! (through `Arc`). Its [`MaterialKind`] picks how integrators treat a hit:
//! diffuse surfaces are shaded (and importance sampled), reflective and
//! reflective+refractive surfaces are followed along their specular
//! directions using [`reflect`], [`refract`] and [`fresnel`].

use crate::sampling::{to_world, uniform_hemisphere};
use kiln_math::{Vec2, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Emission below this norm counts as "not a light".
const EMISSION_EPSILON: f32 = 1e-5;

/// Shading model tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Reflective,
    ReflectiveRefractive,
}

/// Procedural checkerboard over texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkerboard {
    pub scale: f32,
    pub color_a: Color,
    pub color_b: Color,
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self {
            scale: 5.0,
            color_a: Color::new(0.815, 0.235, 0.031),
            color_b: Color::new(0.937, 0.937, 0.231),
        }
    }
}

impl Checkerboard {
    /// Colour at texture coordinate `st`.
    pub fn value(&self, st: Vec2) -> Color {
        let check = |c: f32| (c * self.scale).rem_euclid(1.0) > 0.5;
        if check(st.x) ^ check(st.y) {
            self.color_b
        } else {
            self.color_a
        }
    }
}

/// Material description.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Emitted radiance (zero for non-lights)
    pub emission: Color,
    /// Index of refraction
    pub ior: f32,
    /// Diffuse reflectance
    pub kd: Color,
    /// Specular reflectance (Phong term of the Whitted estimator)
    pub ks: Color,
    /// Surface colour used by the Whitted estimator
    pub diffuse_color: Color,
    pub specular_exponent: f32,
    /// Optional texture replacing `diffuse_color`
    pub texture: Option<Checkerboard>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            emission: Color::ZERO,
            ior: 1.3,
            kd: Color::splat(0.8),
            ks: Color::splat(0.2),
            diffuse_color: Color::splat(0.2),
            specular_exponent: 25.0,
            texture: None,
        }
    }
}

impl Material {
    /// Lambertian surface with reflectance `kd`.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Default::default()
        }
    }

    /// Diffuse surface that also emits `emission`.
    pub fn emissive(kd: Color, emission: Color) -> Self {
        Self {
            kd,
            emission,
            ..Default::default()
        }
    }

    /// Perfect mirror attenuated by the Fresnel term.
    pub fn mirror(ior: f32) -> Self {
        Self {
            kind: MaterialKind::Reflective,
            ior,
            ..Default::default()
        }
    }

    /// Dielectric that both reflects and refracts.
    pub fn glass(ior: f32) -> Self {
        Self {
            kind: MaterialKind::ReflectiveRefractive,
            ior,
            ..Default::default()
        }
    }

    pub fn with_diffuse_color(mut self, color: Color) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_specular(mut self, ks: Color, exponent: f32) -> Self {
        self.ks = ks;
        self.specular_exponent = exponent;
        self
    }

    pub fn with_kd(mut self, kd: Color) -> Self {
        self.kd = kd;
        self
    }

    pub fn with_texture(mut self, texture: Checkerboard) -> Self {
        self.texture = Some(texture);
        self
    }

    /// True if the material emits a non-negligible amount of light.
    pub fn has_emission(&self) -> bool {
        self.emission.length() > EMISSION_EPSILON
    }

    /// True for the two kinds that are followed along specular directions.
    pub fn is_specular(&self) -> bool {
        self.kind != MaterialKind::Diffuse
    }

    /// Diffuse colour at texture coordinate `st`.
    pub fn diffuse_color_at(&self, st: Vec2) -> Color {
        match &self.texture {
            Some(texture) => texture.value(st),
            None => self.diffuse_color,
        }
    }

    /// Draw an outgoing direction for incoming direction `wi` at normal `n`.
    ///
    /// Diffuse surfaces sample the hemisphere around `n` uniformly; the
    /// specular kinds return the mirror direction.
    pub fn sample(&self, wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self.kind {
            MaterialKind::Diffuse => to_world(uniform_hemisphere(rng), n),
            MaterialKind::Reflective | MaterialKind::ReflectiveRefractive => reflect(wi, n),
        }
    }

    /// Solid-angle pdf of [`Material::sample`] producing `wo`.
    ///
    /// Specular kinds are delta distributions and report zero.
    pub fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        match self.kind {
            MaterialKind::Diffuse if n.dot(wo) > 0.0 => 0.5 / PI,
            _ => 0.0,
        }
    }

    /// BRDF value for the pair of directions.
    pub fn eval(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        match self.kind {
            MaterialKind::Diffuse if n.dot(wo) > 0.0 => self.kd / PI,
            _ => Color::ZERO,
        }
    }
}

/// Mirror `i` about `n`.
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * i.dot(n) * n
}

/// Refraction direction of `i` through a surface with normal `n` (Snell's law).
///
/// `n` may face either side; a ray leaving the surface swaps the indices.
/// Returns the zero vector on total internal reflection.
pub fn refract(i: Vec3, n: Vec3, ior: f32) -> Vec3 {
    let mut cosi = i.dot(n).clamp(-1.0, 1.0);
    let mut etai = 1.0;
    let mut etat = ior;
    let mut n = n;
    if cosi < 0.0 {
        cosi = -cosi;
    } else {
        std::mem::swap(&mut etai, &mut etat);
        n = -n;
    }
    let eta = etai / etat;
    let k = 1.0 - eta * eta * (1.0 - cosi * cosi);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * i + (eta * cosi - k.sqrt()) * n
    }
}

/// Fraction of light reflected at a dielectric boundary.
///
/// Returns 1 on total internal reflection. The transmitted fraction is `1 - kr`.
pub fn fresnel(i: Vec3, n: Vec3, ior: f32) -> f32 {
    let cosi = i.dot(n).clamp(-1.0, 1.0);
    let (etai, etat) = if cosi > 0.0 { (ior, 1.0) } else { (1.0, ior) };
    let sint = etai / etat * (1.0 - cosi * cosi).max(0.0).sqrt();
    if sint >= 1.0 {
        return 1.0;
    }
    let cost = (1.0 - sint * sint).max(0.0).sqrt();
    let cosi = cosi.abs();
    let rs = ((etat * cosi) - (etai * cost)) / ((etat * cosi) + (etai * cost));
    let rp = ((etai * cosi) - (etat * cost)) / ((etai * cosi) + (etat * cost));
    (rs * rs + rp * rp) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reflect() {
        let i = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(i, Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_refract_straight_through() {
        let t = refract(Vec3::NEG_Y, Vec3::Y, 1.5);
        assert!((t - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_refract_obeys_snell() {
        let i = Vec3::new(1.0, -1.0, 0.0).normalize();
        let t = refract(i, Vec3::Y, 1.5).normalize();
        let sin_i = i.x;
        let sin_t = t.x;
        assert!((sin_i - 1.5 * sin_t).abs() < 1e-5);
        assert!(t.y < 0.0);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Leaving glass at a grazing angle
        let i = Vec3::new(0.9, 0.1, 0.0).normalize();
        assert_eq!(refract(i, Vec3::Y, 1.5), Vec3::ZERO);
    }

    #[test]
    fn test_fresnel_total_internal_reflection() {
        let i = Vec3::new(0.9, 0.1, 0.0).normalize();
        assert_eq!(fresnel(i, Vec3::Y, 1.5), 1.0);
    }

    #[test]
    fn test_fresnel_normal_incidence() {
        // ((n - 1) / (n + 1))^2 for n = 1.5
        let kr = fresnel(Vec3::NEG_Y, Vec3::Y, 1.5);
        assert!((kr - 0.04).abs() < 1e-5, "kr = {}", kr);
    }

    #[test]
    fn test_fresnel_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2000 {
            let i = crate::sampling::uniform_sphere(&mut rng);
            let n = crate::sampling::uniform_sphere(&mut rng);
            let ior = 1.0 + 2.0 * crate::sampling::gen_f32(&mut rng);
            let kr = fresnel(i, n, ior);
            assert!((0.0..=1.0).contains(&kr), "kr = {} for ior {}", kr, ior);
        }
    }

    #[test]
    fn test_diffuse_pdf_and_eval() {
        let m = Material::diffuse(Color::splat(0.5));
        assert!((m.pdf(Vec3::ZERO, Vec3::Y, Vec3::Y) - 0.5 / PI).abs() < 1e-7);
        assert_eq!(m.pdf(Vec3::ZERO, Vec3::NEG_Y, Vec3::Y), 0.0);
        assert!((m.eval(Vec3::ZERO, Vec3::Y, Vec3::Y) - Color::splat(0.5 / PI)).length() < 1e-7);
        assert_eq!(m.eval(Vec3::ZERO, Vec3::NEG_Y, Vec3::Y), Color::ZERO);
    }

    #[test]
    fn test_diffuse_sample_stays_above_surface() {
        let m = Material::diffuse(Color::ONE);
        let n = Vec3::new(0.0, 0.6, 0.8);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let wo = m.sample(Vec3::NEG_Z, n, &mut rng);
            assert!(m.pdf(Vec3::NEG_Z, wo, n) > 0.0 || wo.dot(n).abs() < 1e-5);
        }
    }

    #[test]
    fn test_mirror_sample_is_reflection() {
        let m = Material::mirror(1.5);
        let mut rng = StdRng::seed_from_u64(0);
        let wi = Vec3::new(1.0, -1.0, 0.0).normalize();
        assert_eq!(m.sample(wi, Vec3::Y, &mut rng), reflect(wi, Vec3::Y));
        assert_eq!(m.pdf(wi, Vec3::Y, Vec3::Y), 0.0);
    }

    #[test]
    fn test_has_emission() {
        assert!(!Material::diffuse(Color::ONE).has_emission());
        assert!(Material::emissive(Color::ONE, Color::new(0.0, 1e-3, 0.0)).has_emission());
    }

    #[test]
    fn test_checkerboard() {
        let m = Material::diffuse(Color::ONE).with_texture(Checkerboard::default());
        let tex = Checkerboard::default();
        assert_eq!(m.diffuse_color_at(Vec2::new(0.05, 0.05)), tex.color_a);
        assert_eq!(m.diffuse_color_at(Vec2::new(0.15, 0.05)), tex.color_b);
        assert_eq!(m.diffuse_color_at(Vec2::new(0.15, 0.15)), tex.color_a);
        assert_eq!(Material::default().diffuse_color_at(Vec2::ZERO), Color::splat(0.2));
    }
}
