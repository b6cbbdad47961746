//! Image tiles.
//!
//! A frame is cut into square buckets in row-major order. Each bucket is an
//! independent unit of work for the thread pool and is copied into the
//! framebuffer by position, so scheduling never changes the image.

use crate::integrator::Integrator;
use crate::renderer::render_pixel;
use crate::{Camera, Color, RenderConfig, Scene};

/// Default bucket side in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// A rectangle of pixels with its top-left corner at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Image coordinates covered by the bucket, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> {
        let Bucket { x, y, width, height } = *self;
        (y..y + height).flat_map(move |py| (x..x + width).map(move |px| (px, py)))
    }
}

/// Buckets of side `size` covering a `width` x `height` image. Buckets on the
/// right and bottom edges are clipped to the image.
pub fn bucket_grid(width: u32, height: u32, size: u32) -> Vec<Bucket> {
    let size = size.max(1);
    (0..height)
        .step_by(size as usize)
        .flat_map(move |y| {
            (0..width).step_by(size as usize).map(move |x| Bucket {
                x,
                y,
                width: size.min(width - x),
                height: size.min(height - y),
            })
        })
        .collect()
}

/// Pixels of one rendered bucket, in [`Bucket::pixels`] order.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

/// Render every pixel of `bucket`.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    camera: &Camera,
    integrator: &dyn Integrator,
    config: &RenderConfig,
) -> BucketResult {
    let pixels = bucket
        .pixels()
        .map(|(x, y)| render_pixel(scene, camera, integrator, x, y, config))
        .collect();
    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::PointLight;
    use crate::{IntegratorKind, Material, Sphere};
    use kiln_math::Vec3;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_grid_covers_each_pixel_once() {
        for (width, height, size) in [(128, 128, 64), (100, 70, 64), (7, 5, 1), (10, 3, 32)] {
            let mut seen = HashSet::new();
            for bucket in bucket_grid(width, height, size) {
                assert_eq!(bucket.pixels().count(), bucket.pixel_count());
                for (x, y) in bucket.pixels() {
                    assert!(x < width && y < height);
                    assert!(seen.insert((x, y)), "({}, {}) covered twice", x, y);
                }
            }
            assert_eq!(seen.len(), (width * height) as usize);
        }
    }

    #[test]
    fn test_edge_buckets_are_clipped() {
        let buckets = bucket_grid(100, 70, 64);
        let corners: Vec<_> = buckets.iter().map(|b| (b.x, b.y, b.width, b.height)).collect();
        assert_eq!(
            corners,
            [(0, 0, 64, 64), (64, 0, 36, 64), (0, 64, 64, 6), (64, 64, 36, 6)]
        );

        // Zero size is treated as one pixel
        assert_eq!(bucket_grid(3, 2, 0).len(), 6);
        assert!(bucket_grid(0, 4, 8).is_empty());
    }

    #[test]
    fn test_pixels_are_row_major() {
        let bucket = Bucket {
            x: 4,
            y: 10,
            width: 2,
            height: 2,
        };
        let pixels: Vec<_> = bucket.pixels().collect();
        assert_eq!(pixels, [(4, 10), (5, 10), (4, 11), (5, 11)]);
    }

    #[test]
    fn test_render_bucket_matches_render_pixel() {
        let scene = Scene::builder()
            .add(Sphere::new(
                Vec3::new(0.0, 0.0, -3.0),
                1.0,
                Arc::new(Material::diffuse(Color::splat(0.8))),
            ))
            .add_light(PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE))
            .build();
        let config = RenderConfig {
            width: 12,
            height: 9,
            samples_per_pixel: 4,
            integrator: IntegratorKind::Whitted,
            ..Default::default()
        };
        let camera = config.camera();
        let integrator = config.integrator();

        let bucket = Bucket {
            x: 3,
            y: 2,
            width: 5,
            height: 4,
        };
        let result = render_bucket(&bucket, &scene, &camera, integrator.as_ref(), &config);
        assert_eq!(result.bucket, bucket);
        assert_eq!(result.pixels.len(), 20);
        for ((x, y), color) in bucket.pixels().zip(&result.pixels) {
            let expected = render_pixel(&scene, &camera, integrator.as_ref(), x, y, &config);
            assert_eq!(*color, expected);
        }
    }
}
