//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree with exactly one primitive per leaf. The default build is a
//! median split on the longest axis of the centroid bounds; a bucketed
//! surface area heuristic is available as an alternative split policy.
//!
//! Every node caches the summed surface area below it, which lets
//! [`Bvh::sample`] pick a point proportionally to area by a single descent.

use crate::intersection::{Intersection, Object, SurfaceSample};
use crate::sampling::gen_f32;
use kiln_math::{Bounds3, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Number of buckets evaluated by the SAH split.
const SAH_BUCKETS: usize = 12;

/// How interior nodes divide their primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Sort by centroid on the widest axis and split at `n / 2`.
    #[default]
    Middle,
    /// Bucketed surface area heuristic.
    Sah,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug)]
pub enum BvhNode {
    Leaf {
        bounds: Bounds3,
        area: f32,
        /// Index into the primitive list of the owning [`Bvh`]
        primitive: usize,
    },
    Interior {
        bounds: Bounds3,
        area: f32,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    pub fn bounds(&self) -> Bounds3 {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Interior { bounds, .. } => *bounds,
        }
    }

    /// Summed surface area of the primitives below this node.
    pub fn area(&self) -> f32 {
        match self {
            BvhNode::Leaf { area, .. } | BvhNode::Interior { area, .. } => *area,
        }
    }

    fn interior(left: BvhNode, right: BvhNode) -> Self {
        BvhNode::Interior {
            bounds: left.bounds().union(&right.bounds()),
            area: left.area() + right.area(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Build statistics, reported in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    pub build_time: Duration,
}

/// Per-primitive data gathered once before the recursive build.
#[derive(Debug, Clone, Copy)]
struct PrimitiveInfo {
    index: usize,
    bounds: Bounds3,
    centroid: Vec3,
    area: f32,
}

/// A BVH owning its primitives.
pub struct Bvh<T> {
    primitives: Vec<T>,
    root: Option<BvhNode>,
    split_method: SplitMethod,
    stats: BvhStats,
}

impl<T: Object> Bvh<T> {
    /// Build a median-split BVH.
    pub fn new(primitives: Vec<T>) -> Self {
        Self::with_split_method(primitives, SplitMethod::Middle)
    }

    /// Build a BVH with the given split policy.
    pub fn with_split_method(primitives: Vec<T>, split_method: SplitMethod) -> Self {
        let start = Instant::now();
        let mut stats = BvhStats::default();

        let mut infos: Vec<PrimitiveInfo> = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let bounds = p.bounds();
                PrimitiveInfo {
                    index,
                    bounds,
                    centroid: bounds.centroid(),
                    area: p.area(),
                }
            })
            .collect();

        let root = if infos.is_empty() {
            None
        } else {
            Some(Self::build(&mut infos, split_method, 1, &mut stats))
        };
        stats.build_time = start.elapsed();

        log::info!(
            "BVH built ({:?}): {} primitives, {} nodes, {} leaves, depth {}, {:.2?}",
            split_method,
            primitives.len(),
            stats.nodes,
            stats.leaves,
            stats.depth,
            stats.build_time
        );

        Self {
            primitives,
            root,
            split_method,
            stats,
        }
    }

    /// Recursive construction over a non-empty slice of primitive infos.
    fn build(
        infos: &mut [PrimitiveInfo],
        split_method: SplitMethod,
        depth: usize,
        stats: &mut BvhStats,
    ) -> BvhNode {
        stats.nodes += 1;
        stats.depth = stats.depth.max(depth);

        match infos.len() {
            1 => {
                let info = infos[0];
                stats.leaves += 1;
                BvhNode::Leaf {
                    bounds: info.bounds,
                    area: info.area,
                    primitive: info.index,
                }
            }
            2 => {
                let (left_infos, right_infos) = infos.split_at_mut(1);
                let left = Self::build(left_infos, split_method, depth + 1, stats);
                let right = Self::build(right_infos, split_method, depth + 1, stats);
                BvhNode::interior(left, right)
            }
            _ => {
                let centroid_bounds = infos
                    .iter()
                    .fold(Bounds3::EMPTY, |acc, info| acc.union_point(info.centroid));
                let axis = centroid_bounds.max_extent();

                // Stable sort: primitives with equal centroids keep their order
                infos.sort_by(|a, b| {
                    a.centroid[axis]
                        .partial_cmp(&b.centroid[axis])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let mid = match split_method {
                    SplitMethod::Middle => infos.len() / 2,
                    SplitMethod::Sah => Self::sah_split(infos, axis, &centroid_bounds),
                };

                let (left_infos, right_infos) = infos.split_at_mut(mid);
                let left = Self::build(left_infos, split_method, depth + 1, stats);
                let right = Self::build(right_infos, split_method, depth + 1, stats);
                BvhNode::interior(left, right)
            }
        }
    }

    /// Split point minimising the bucketed SAH cost. `infos` must already be
    /// sorted along `axis`. Falls back to the median when the centroids do not
    /// spread or the best split would leave one side empty.
    fn sah_split(infos: &[PrimitiveInfo], axis: usize, centroid_bounds: &Bounds3) -> usize {
        let median = infos.len() / 2;
        if centroid_bounds.p_max[axis] <= centroid_bounds.p_min[axis] {
            return median;
        }

        let bucket_of = |info: &PrimitiveInfo| {
            let b = (SAH_BUCKETS as f32 * centroid_bounds.offset(info.centroid)[axis]) as usize;
            b.min(SAH_BUCKETS - 1)
        };

        let mut counts = [0usize; SAH_BUCKETS];
        let mut bounds = [Bounds3::EMPTY; SAH_BUCKETS];
        for info in infos {
            let b = bucket_of(info);
            counts[b] += 1;
            bounds[b] = bounds[b].union(&info.bounds);
        }

        let mut best_cost = f32::INFINITY;
        let mut best_split = median;
        for split in 0..SAH_BUCKETS - 1 {
            let (mut b0, mut b1) = (Bounds3::EMPTY, Bounds3::EMPTY);
            let (mut count0, mut count1) = (0, 0);
            for b in 0..=split {
                b0 = b0.union(&bounds[b]);
                count0 += counts[b];
            }
            for b in split + 1..SAH_BUCKETS {
                b1 = b1.union(&bounds[b]);
                count1 += counts[b];
            }
            if count0 == 0 || count1 == 0 {
                continue;
            }

            let cost = count0 as f32 * b0.surface_area() + count1 as f32 * b1.surface_area();
            if cost < best_cost {
                best_cost = cost;
                // Sorted along the axis, so the first count0 entries are the left side
                best_split = count0;
            }
        }
        best_split
    }

    /// Nearest hit, or a miss record when nothing is hit.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        match &self.root {
            Some(root) => self.intersect_node(root, ray),
            None => Intersection::miss(),
        }
    }

    /// Visits both children of every node whose box the ray crosses and keeps
    /// the closer record.
    fn intersect_node<'a>(&'a self, node: &'a BvhNode, ray: &Ray) -> Intersection<'a> {
        if !node.bounds().hit(ray) {
            return Intersection::miss();
        }

        match node {
            BvhNode::Leaf { primitive, .. } => self.primitives[*primitive].get_intersection(ray),
            BvhNode::Interior { left, right, .. } => {
                let hit_left = self.intersect_node(left, ray);
                let hit_right = self.intersect_node(right, ray);
                hit_left.nearest(hit_right)
            }
        }
    }

    /// Draw a point on the union of all primitives, uniformly by area.
    ///
    /// The leaf is picked with a draw linear in area (`ξ · total`), so each
    /// primitive is chosen with probability `area / total`.
    ///
    /// Returns the sample and its area-measure pdf, or `None` for an empty
    /// tree or one with zero total area.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<(SurfaceSample, f32)> {
        let root = self.root.as_ref()?;
        let total = root.area();
        if total <= 0.0 {
            return None;
        }

        let p = gen_f32(rng) * total;
        let (sample, pdf) = self.sample_node(root, p, rng);
        Some((sample, pdf / total))
    }

    /// Descend towards the leaf whose area range contains `p`. The leaf's own
    /// pdf is scaled by its area; the root divides by the total afterwards.
    fn sample_node(&self, node: &BvhNode, p: f32, rng: &mut dyn RngCore) -> (SurfaceSample, f32) {
        match node {
            BvhNode::Leaf { primitive, area, .. } => {
                let (sample, pdf) = self.primitives[*primitive].sample(rng);
                let pdf = if *area > 0.0 { pdf * area } else { 0.0 };
                (sample, pdf)
            }
            BvhNode::Interior { left, right, .. } => {
                if p < left.area() {
                    self.sample_node(left, p, rng)
                } else {
                    self.sample_node(right, p - left.area(), rng)
                }
            }
        }
    }

    /// Bounds of the whole tree (empty for an empty tree).
    pub fn world_bound(&self) -> Bounds3 {
        self.root
            .as_ref()
            .map(BvhNode::bounds)
            .unwrap_or(Bounds3::EMPTY)
    }

    /// Summed area of every primitive in the tree.
    pub fn total_area(&self) -> f32 {
        self.root.as_ref().map(BvhNode::area).unwrap_or(0.0)
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Primitives in insertion order.
    pub fn primitives(&self) -> &[T] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn stats(&self) -> BvhStats {
        self.stats
    }
}
