//! Kiln Renderer - CPU ray tracing
//!
//! Scenes of spheres, triangles and triangle meshes are organised in a
//! bounding volume hierarchy and shaded by one of two estimators:
//!
//! - **Whitted**: recursive mirror and glass rays plus Blinn-Phong direct
//!   light from point lights
//! - **Path**: Monte Carlo path tracing with next-event estimation towards
//!   emissive surfaces and Russian roulette termination
//!
//! # Example
//!
//! ```
//! use kiln_renderer::{render, Color, Material, PointLight, RenderConfig, Scene, Sphere, Vec3};
//! use kiln_renderer::IntegratorKind;
//! use std::sync::Arc;
//!
//! let scene = Scene::builder()
//!     .add(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, Arc::new(Material::default())))
//!     .add_light(PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE))
//!     .build();
//!
//! let config = RenderConfig {
//!     width: 8,
//!     height: 8,
//!     samples_per_pixel: 1,
//!     integrator: IntegratorKind::Whitted,
//!     ..Default::default()
//! };
//! let image = render(&scene, &config)?;
//! assert_eq!(image.pixels.len(), 64);
//! # Ok::<(), kiln_renderer::ConfigError>(())
//! ```

mod bucket;
mod bvh;
mod camera;
mod config;
mod integrator;
mod intersection;
mod light;
mod material;
mod mesh_triangle;
mod path;
mod primitive;
mod renderer;
mod sampling;
mod scene;
pub mod scenes;
mod sphere;
mod triangle;
mod whitted;

pub use bucket::{bucket_grid, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, BvhStats, SplitMethod};
pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, RenderConfig};
pub use integrator::{Integrator, IntegratorKind};
pub use intersection::{Intersection, Object, SurfaceProperties, SurfaceSample};
pub use light::{AreaLight, Light, PointLight};
pub use material::{fresnel, reflect, refract, Checkerboard, Color, Material, MaterialKind};
pub use mesh_triangle::TriangleMesh;
pub use path::{PathIntegrator, MAX_RUSSIAN_ROULETTE};
pub use primitive::Primitive;
pub use renderer::{color_to_rgba, linear_to_gamma, render, render_pixel, ImageBuffer};
pub use scene::{Scene, SceneBuilder, Traversal};
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use whitted::WhittedIntegrator;

/// Re-export math types from kiln_math
pub use kiln_math::{Bounds3, Ray, Vec2, Vec3};
