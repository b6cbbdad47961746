//! Render settings.
//!
//! [`RenderConfig`] is deserializable with every field optional, so a JSON
//! file only needs to list the settings it changes.

use crate::integrator::{Integrator, IntegratorKind};
use crate::scene::Traversal;
use crate::path::MAX_RUSSIAN_ROULETTE;
use crate::{Camera, Color, PathIntegrator, WhittedIntegrator};
use kiln_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by [`RenderConfig::validate`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Russian roulette probability {0} is outside (0, {max}]", max = MAX_RUSSIAN_ROULETTE)]
    InvalidRussianRoulette(f32),

    #[error("Field of view {0} must be between 0 and 180 degrees")]
    InvalidFov(f32),

    #[error("Bucket size must be at least 1")]
    ZeroBucketSize,
}

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything a render needs besides the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub samples_per_pixel: u32,
    pub integrator: IntegratorKind,
    pub traversal: Traversal,
    /// Whitted recursion limit
    pub max_depth: u32,
    /// Whitted escape colour
    pub background: Color,
    /// Path continuation probability
    pub russian_roulette: f32,
    /// Secondary ray offset
    pub epsilon: f32,
    pub seed: u64,
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            fov: 90.0,
            eye: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            samples_per_pixel: 16,
            integrator: IntegratorKind::Path,
            traversal: Traversal::Bvh,
            max_depth: 5,
            background: Color::new(0.235294, 0.67451, 0.843137),
            russian_roulette: 0.8,
            epsilon: 1e-3,
            seed: 0,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Check that the settings describe a render that can run.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if !(self.russian_roulette > 0.0 && self.russian_roulette <= MAX_RUSSIAN_ROULETTE) {
            return Err(ConfigError::InvalidRussianRoulette(self.russian_roulette));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::InvalidFov(self.fov));
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::ZeroBucketSize);
        }
        Ok(())
    }

    /// Camera for these settings.
    pub fn camera(&self) -> Camera {
        Camera::new()
            .with_resolution(self.width, self.height)
            .with_position(self.eye, self.look_at, self.up)
            .with_fov(self.fov)
    }

    /// The configured estimator.
    pub fn integrator(&self) -> Box<dyn Integrator> {
        match self.integrator {
            IntegratorKind::Whitted => Box::new(
                WhittedIntegrator::new(self.max_depth, self.background)
                    .with_epsilon(self.epsilon)
                    .with_traversal(self.traversal),
            ),
            IntegratorKind::Path => Box::new(
                PathIntegrator::new(self.russian_roulette)
                    .with_epsilon(self.epsilon)
                    .with_traversal(self.traversal),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(RenderConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configs() {
        let base = RenderConfig::default();

        let config = RenderConfig { width: 0, ..base.clone() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, height: 240 })
        );

        let config = RenderConfig { samples_per_pixel: 0, ..base.clone() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSamples));

        for rr in [0.0, -0.5, 1.5, f32::NAN] {
            let config = RenderConfig { russian_roulette: rr, ..base.clone() };
            assert!(matches!(config.validate(), Err(ConfigError::InvalidRussianRoulette(_))));
        }
        // A path that always continues never ends inside a closed scene
        let config = RenderConfig { russian_roulette: 1.0, ..base.clone() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRussianRoulette(1.0)));
        let config = RenderConfig { russian_roulette: MAX_RUSSIAN_ROULETTE, ..base.clone() };
        assert_eq!(config.validate(), Ok(()));

        let config = RenderConfig { fov: 0.0, ..base.clone() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFov(0.0)));

        let config = RenderConfig { bucket_size: 0, ..base };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBucketSize));
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let json = r#"{ "width": 64, "integrator": "whitted", "eye": [1.0, 2.0, 3.0] }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 240);
        assert_eq!(config.integrator, IntegratorKind::Whitted);
        assert_eq!(config.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.russian_roulette, 0.8);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = RenderConfig {
            traversal: Traversal::Linear,
            seed: 7,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
