//! Scene: primitives, lights and the top-level BVH.
//!
//! A scene is assembled through [`SceneBuilder`]; [`SceneBuilder::build`]
//! constructs the BVH once, so a [`Scene`] is always ready to be queried and
//! is immutable afterwards (safe to share between render threads).

use crate::bvh::{Bvh, SplitMethod};
use crate::intersection::{Intersection, Object, SurfaceSample};
use crate::light::{AreaLight, Light};
use crate::sampling::gen_f32;
use crate::Primitive;
use kiln_math::{Bounds3, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How the scene answers nearest-hit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    #[default]
    Bvh,
    /// Test every primitive; reference results for the BVH
    Linear,
}

/// Collects primitives and lights before the BVH build.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Primitive>,
    lights: Vec<Light>,
    split_method: SplitMethod,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive.
    pub fn add(mut self, object: impl Into<Primitive>) -> Self {
        self.objects.push(object.into());
        self
    }

    /// Add an explicit light.
    pub fn add_light(mut self, light: impl Into<Light>) -> Self {
        self.lights.push(light.into());
        self
    }

    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Build the BVH and freeze the scene.
    pub fn build(self) -> Scene {
        let emissive: Vec<&Primitive> = self.objects.iter().filter(|o| o.has_emit()).collect();
        let emissive_area: f32 = emissive.iter().map(|o| o.area()).sum();
        let emissive_count = emissive.len();
        let light_area =
            emissive_area + area_lights(&self.lights).map(AreaLight::area).sum::<f32>();

        let bvh = Bvh::with_split_method(self.objects, self.split_method);

        log::info!(
            "Scene built: {} primitives ({} emissive, area {:.3}), {} lights",
            bvh.len(),
            emissive_count,
            emissive_area,
            self.lights.len()
        );
        if emissive_count == 0 && self.lights.is_empty() {
            log::warn!("Scene has no lights");
        }

        Scene {
            bvh,
            lights: self.lights,
            emissive_area,
            light_area,
        }
    }
}

fn area_lights(lights: &[Light]) -> impl Iterator<Item = &AreaLight> {
    lights.iter().filter_map(|light| match light {
        Light::Area(area) => Some(area),
        Light::Point(_) => None,
    })
}

/// Something [`Scene::sample_light`] can pick.
enum Emitter<'a> {
    Surface(&'a Primitive),
    Light(&'a AreaLight),
}

impl Emitter<'_> {
    fn area(&self) -> f32 {
        match self {
            Emitter::Surface(object) => object.area(),
            Emitter::Light(light) => light.area(),
        }
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        match self {
            Emitter::Surface(object) => object.sample(rng).0,
            Emitter::Light(light) => light.sample(rng),
        }
    }
}

/// A ready-to-render scene.
pub struct Scene {
    bvh: Bvh<Primitive>,
    lights: Vec<Light>,
    emissive_area: f32,
    /// Emissive primitives plus area lights
    light_area: f32,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// Nearest hit through the BVH.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    /// Nearest hit by testing every primitive, as `(t, index, primitive)`.
    pub fn trace(&self, ray: &Ray) -> Option<(f32, u32, &Primitive)> {
        let mut nearest: Option<(f32, u32, &Primitive)> = None;
        for object in self.objects() {
            if let Some((t, index)) = object.intersect(ray) {
                if nearest.map_or(true, |(t_near, _, _)| t < t_near) {
                    nearest = Some((t, index, object));
                }
            }
        }
        nearest
    }

    /// Full intersection record of the linear scan.
    pub fn intersect_linear(&self, ray: &Ray) -> Intersection<'_> {
        match self.trace(ray) {
            Some((_, _, object)) => object.get_intersection(ray),
            None => Intersection::miss(),
        }
    }

    /// Nearest hit using the requested traversal.
    pub fn query(&self, ray: &Ray, traversal: Traversal) -> Intersection<'_> {
        match traversal {
            Traversal::Bvh => self.intersect(ray),
            Traversal::Linear => self.intersect_linear(ray),
        }
    }

    /// Uniform point on the union of all emissive primitives and area lights.
    ///
    /// An emitter is chosen with probability proportional to its area and
    /// sampled uniformly, so the returned pdf is `1 / light_area`. Returns
    /// `None` when nothing in the scene emits.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<(SurfaceSample, f32)> {
        if self.light_area <= 0.0 {
            return None;
        }

        let emitters = self
            .objects()
            .iter()
            .filter(|o| o.has_emit())
            .map(Emitter::Surface)
            .chain(area_lights(&self.lights).map(Emitter::Light));

        let mut remaining = gen_f32(rng) * self.light_area;
        let mut chosen = None;
        for emitter in emitters {
            let area = emitter.area();
            chosen = Some(emitter);
            if remaining < area {
                break;
            }
            remaining -= area;
        }

        Some((chosen?.sample(rng), 1.0 / self.light_area))
    }

    pub fn objects(&self) -> &[Primitive] {
        self.bvh.primitives()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn emissive_area(&self) -> f32 {
        self.emissive_area
    }

    /// Total area [`Scene::sample_light`] draws from.
    pub fn light_area(&self) -> f32 {
        self.light_area
    }

    pub fn world_bound(&self) -> Bounds3 {
        self.bvh.world_bound()
    }

    pub fn bvh(&self) -> &Bvh<Primitive> {
        &self.bvh
    }
}
