//! Pinhole camera for primary ray generation.

use kiln_math::{Ray, Vec3};

/// Camera that maps pixel centres to world-space rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,

    // Cached basis and screen scale (set by initialize())
    u: Vec3,
    v: Vec3,
    w: Vec3,
    scale: f32,
    aspect: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 600,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            scale: 1.0,
            aspect: 1.0,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.initialize();
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.initialize();
        self
    }

    /// Recompute the cached basis from the current settings.
    fn initialize(&mut self) {
        self.scale = (self.vfov.to_radians() * 0.5).tan();
        self.aspect = self.image_width as f32 / self.image_height.max(1) as f32;

        // Degenerate setups fall back to looking down -Z with Y up
        self.w = (self.look_from - self.look_at).try_normalize().unwrap_or(Vec3::Z);
        self.u = self.vup.cross(self.w).try_normalize().unwrap_or(Vec3::X);
        self.v = self.w.cross(self.u);
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }

    /// Ray through the centre of pixel `(i, j)`; `j` counts rows from the top.
    pub fn get_ray(&self, i: u32, j: u32) -> Ray {
        self.get_ray_offset(i, j, 0.5, 0.5)
    }

    /// Ray through pixel `(i, j)` at sub-pixel position `(dx, dy)` in `[0, 1)`.
    pub fn get_ray_offset(&self, i: u32, j: u32, dx: f32, dy: f32) -> Ray {
        let x = (2.0 * (i as f32 + dx) / self.image_width as f32 - 1.0) * self.aspect * self.scale;
        let y = (1.0 - 2.0 * (j as f32 + dy) / self.image_height as f32) * self.scale;

        // View-space direction (x, y, -1) rotated into world space
        let direction = (x * self.u + y * self.v - self.w).normalize();
        Ray::new(self.look_from, direction)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_initialize() {
        let camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);

        assert_eq!(camera.look_from(), Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 0.001);
        assert!((camera.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_ray_direction() {
        let camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);

        // Centre of the image looks straight down -Z
        let ray = camera.get_ray_offset(50, 50, 0.0, 0.0);
        assert!((ray.direction() - Vec3::NEG_Z).length() < 1e-6);

        // Top-left pixel centre
        let ray = camera.get_ray(0, 0);
        let expected = Vec3::new(-0.99, 0.99, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-5);
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_aspect() {
        let camera = Camera::new().with_resolution(200, 100).with_fov(90.0);

        // Right edge of a 2:1 image at the vertical centre
        let ray = camera.get_ray_offset(200, 50, 0.0, 0.0);
        let expected = Vec3::new(2.0, 0.0, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-5);
    }

    #[test]
    fn test_camera_looks_at_target() {
        let camera = Camera::new()
            .with_resolution(64, 64)
            .with_position(Vec3::new(278.0, 273.0, -800.0), Vec3::new(278.0, 273.0, 0.0), Vec3::Y)
            .with_fov(40.0);

        let ray = camera.get_ray_offset(32, 32, 0.0, 0.0);
        assert!((ray.direction() - Vec3::Z).length() < 1e-5);
        assert_eq!(ray.origin(), Vec3::new(278.0, 273.0, -800.0));
    }
}
