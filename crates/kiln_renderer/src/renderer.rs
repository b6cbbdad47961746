//! Parallel frame renderer.
//!
//! Buckets are rendered on the rayon thread pool. Each pixel owns a random
//! generator seeded from the render seed and its index, so an image is
//! reproducible regardless of how buckets are scheduled.

use crate::bucket::{bucket_grid, render_bucket, BucketResult};
use crate::config::{ConfigResult, RenderConfig};
use crate::integrator::Integrator;
use crate::sampling::gen_f32;
use crate::{Camera, Color, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Linear colour framebuffer in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Offset of pixel (x, y), computed in `usize` so large frames do not
    /// overflow.
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        for ((x, y), color) in result.bucket.pixels().zip(&result.pixels) {
            self.set(x, y, *color);
        }
    }

    /// Convert to gamma-encoded RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let encode = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Seed of the generator that renders pixel `index`.
fn pixel_seed(seed: u64, index: u64) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(index)
}

/// Average of `samples_per_pixel` estimates for pixel `(x, y)`.
///
/// A single sample goes through the pixel centre; more samples are jittered
/// across the pixel.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    integrator: &dyn Integrator,
    x: u32,
    y: u32,
    config: &RenderConfig,
) -> Color {
    let index = y as u64 * config.width as u64 + x as u64;
    let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, index));

    let spp = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;
    for _ in 0..spp {
        let ray = if spp == 1 {
            camera.get_ray(x, y)
        } else {
            let (dx, dy) = (gen_f32(&mut rng), gen_f32(&mut rng));
            camera.get_ray_offset(x, y, dx, dy)
        };
        pixel_color += integrator.cast_ray(scene, &ray, 0, &mut rng);
    }

    pixel_color / spp as f32
}

/// Render the whole frame in parallel buckets.
pub fn render(scene: &Scene, config: &RenderConfig) -> ConfigResult<ImageBuffer> {
    config.validate()?;

    let camera = config.camera();
    let integrator = config.integrator();
    let buckets = bucket_grid(config.width, config.height, config.bucket_size);
    let total = buckets.len();

    log::info!(
        "Rendering {}x{} at {} spp ({:?}, {:?} traversal) in {} buckets",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.integrator,
        config.traversal,
        total
    );

    let start = Instant::now();
    let finished = AtomicUsize::new(0);
    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, scene, &camera, integrator.as_ref(), config);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {}/{} done", done, total);
            result
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}
