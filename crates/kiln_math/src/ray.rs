use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The componentwise inverse of the direction and the per-axis sign flags are
/// computed once at construction, since every bounding box test needs them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// `1 / direction`, with zero components mapping to signed infinity.
    pub inv_direction: Vec3,
    /// `true` for axes along which the ray travels towards negative values.
    pub dir_is_neg: [bool; 3],
}

impl Ray {
    /// Create a new ray. The direction is stored as given.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let inv_direction = direction.recip();
        // Sign taken from the inverse so that a -0.0 component (inverse -inf)
        // is classified the same way the slab test will see it.
        let dir_is_neg = [
            inv_direction.x < 0.0,
            inv_direction.y < 0.0,
            inv_direction.z < 0.0,
        ];

        Self {
            origin,
            direction,
            inv_direction,
            dir_is_neg,
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(0.0, 1.0, 0.0);
        let ray = Ray::new(origin, direction);

        assert_eq!(ray.origin, origin);
        assert_eq!(ray.direction, direction);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_inverse_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, -4.0, 0.0));

        assert_eq!(ray.inv_direction.x, 0.5);
        assert_eq!(ray.inv_direction.y, -0.25);
        assert_eq!(ray.inv_direction.z, f32::INFINITY);
        assert_eq!(ray.dir_is_neg, [false, true, false]);
    }

    #[test]
    fn test_ray_negative_zero_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, -0.0, 0.0));

        assert_eq!(ray.inv_direction.y, f32::NEG_INFINITY);
        assert_eq!(ray.dir_is_neg, [false, true, false]);
    }

    #[test]
    fn test_ray_getters() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(4.0, 5.0, 6.0);
        let ray = Ray::new(origin, direction);

        assert_eq!(ray.origin(), ray.origin);
        assert_eq!(ray.direction(), ray.direction);
    }
}
