use crate::{Ray, Vec3};

/// Axis-aligned bounding box for spatial acceleration structures (BVH).
///
/// Defined by its two extreme corners. Boxes built from points or unions always
/// satisfy `p_min <= p_max` componentwise; [`Bounds3::EMPTY`] is the inverted
/// sentinel that acts as the identity for [`Bounds3::union`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub p_min: Vec3,
    pub p_max: Vec3,
}

impl Bounds3 {
    /// An empty box (contains nothing, union identity).
    pub const EMPTY: Bounds3 = Bounds3 {
        p_min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        p_max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Create a box spanning two corner points, in any order.
    pub fn new(p1: Vec3, p2: Vec3) -> Self {
        Self {
            p_min: p1.min(p2),
            p_max: p1.max(p2),
        }
    }

    /// Create a degenerate box containing a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            p_min: self.p_min.min(other.p_min),
            p_max: self.p_max.max(other.p_max),
        }
    }

    /// Smallest box containing this box and a point.
    pub fn union_point(&self, p: Vec3) -> Bounds3 {
        Bounds3 {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// True for the inverted sentinel (or any box with a negative extent).
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    pub fn diagonal(&self) -> Vec3 {
        self.p_max - self.p_min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the earlier axis.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    /// Overlapping region of two boxes. Disjoint boxes produce an empty box.
    pub fn intersect(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            p_min: self.p_min.max(other.p_min),
            p_max: self.p_max.min(other.p_max),
        }
    }

    /// Position of `p` relative to the box: `p_min` maps to 0, `p_max` to 1.
    ///
    /// Axes with zero extent are left unscaled.
    pub fn offset(&self, p: Vec3) -> Vec3 {
        let mut o = p - self.p_min;
        let d = self.diagonal();
        for axis in 0..3 {
            if d[axis] > 0.0 {
                o[axis] /= d[axis];
            }
        }
        o
    }

    pub fn overlaps(&self, other: &Bounds3) -> bool {
        let x = self.p_max.x >= other.p_min.x && self.p_min.x <= other.p_max.x;
        let y = self.p_max.y >= other.p_min.y && self.p_min.y <= other.p_max.y;
        let z = self.p_max.z >= other.p_min.z && self.p_min.z <= other.p_max.z;
        x && y && z
    }

    /// Inclusive point containment test.
    pub fn inside(&self, p: Vec3) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }

    /// Slab test against a ray.
    ///
    /// `inv_dir` is the componentwise inverse of the ray direction and
    /// `dir_is_neg` flags the axes where it is negative, so that the nearer slab
    /// boundary always comes first. Zero direction components rely on the
    /// signed infinities in `inv_dir`.
    pub fn intersect_p(&self, ray: &Ray, inv_dir: Vec3, dir_is_neg: [bool; 3]) -> bool {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let mut t_min = (self.p_min[axis] - ray.origin[axis]) * inv_dir[axis];
            let mut t_max = (self.p_max[axis] - ray.origin[axis]) * inv_dir[axis];
            if dir_is_neg[axis] {
                std::mem::swap(&mut t_min, &mut t_max);
            }
            t_enter = t_enter.max(t_min);
            t_exit = t_exit.min(t_max);
        }

        t_enter < t_exit && t_exit >= 0.0
    }

    /// Slab test using the inverse direction cached on the ray.
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        self.intersect_p(ray, ray.inv_direction, ray.dir_is_neg)
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::ops::Index<usize> for Bounds3 {
    type Output = Vec3;

    /// Index 0 is `p_min`, anything else `p_max`.
    fn index(&self, i: usize) -> &Vec3 {
        if i == 0 {
            &self.p_min
        } else {
            &self.p_max
        }
    }
}
