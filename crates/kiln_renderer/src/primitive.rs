//! Scene-level primitive: a tagged union of the supported shapes.

use crate::intersection::{Intersection, Object, SurfaceProperties, SurfaceSample};
use crate::{Color, Material, Sphere, Triangle, TriangleMesh};
use kiln_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;

/// Any shape that can be placed in a scene.
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Mesh(TriangleMesh),
}

impl Primitive {
    fn object(&self) -> &dyn Object {
        match self {
            Primitive::Sphere(s) => s,
            Primitive::Triangle(t) => t,
            Primitive::Mesh(m) => m,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Triangle(t) => t.material(),
            Primitive::Mesh(m) => m.material(),
        }
    }

    /// Shading normal and texture coordinates at hit point `p`.
    ///
    /// `index` and `uv` are the triangle index and barycentrics from the
    /// [`Intersection`]; spheres ignore both.
    pub fn surface_properties(&self, p: Vec3, index: u32, uv: Vec2) -> SurfaceProperties {
        match self {
            Primitive::Sphere(s) => {
                let normal = (p - s.center()).normalize_or_zero();
                SurfaceProperties {
                    normal,
                    st: Sphere::get_sphere_uv(normal),
                }
            }
            Primitive::Triangle(t) => SurfaceProperties {
                normal: t.normal(),
                st: uv,
            },
            Primitive::Mesh(m) => m.surface_properties(index, uv),
        }
    }

    /// Diffuse colour at texture coordinates `st`.
    pub fn eval_diffuse_color(&self, st: Vec2) -> Color {
        self.material().diffuse_color_at(st)
    }
}

impl Object for Primitive {
    fn intersect(&self, ray: &Ray) -> Option<(f32, u32)> {
        self.object().intersect(ray)
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        let mut hit = self.object().get_intersection(ray);
        if hit.happened {
            hit.object = Some(self);
        }
        hit
    }

    fn bounds(&self) -> Bounds3 {
        self.object().bounds()
    }

    fn area(&self) -> f32 {
        self.object().area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (SurfaceSample, f32) {
        self.object().sample(rng)
    }

    fn has_emit(&self) -> bool {
        self.object().has_emit()
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

impl From<TriangleMesh> for Primitive {
    fn from(mesh: TriangleMesh) -> Self {
        Primitive::Mesh(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Checkerboard;
    use kiln_core::Mesh;
    use std::sync::Arc;

    #[test]
    fn test_hit_records_owning_primitive() {
        let prim: Primitive = Sphere::new(Vec3::ZERO, 1.0, Arc::new(Material::default())).into();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = prim.get_intersection(&ray);
        assert!(hit.happened);
        assert!(hit.object.is_some_and(|o| std::ptr::eq(o, &prim)));

        let miss = prim.get_intersection(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z));
        assert!(miss.object.is_none());
    }

    #[test]
    fn test_sphere_surface_properties() {
        let prim: Primitive =
            Sphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0, Arc::new(Material::default())).into();
        let props = prim.surface_properties(Vec3::new(1.0, 2.0, 0.0), 0, Vec2::ZERO);
        assert!((props.normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_textured_mesh_color() {
        let material = Arc::new(Material::diffuse(Vec3::ONE).with_texture(Checkerboard::default()));
        let mesh = Mesh::new_with_uvs(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
        )
        .unwrap();
        let prim: Primitive = TriangleMesh::new(&mesh, material).into();

        let ray = Ray::new(Vec3::new(0.15, 0.05, 1.0), Vec3::NEG_Z);
        let hit = prim.get_intersection(&ray);
        assert!(hit.happened);

        let props = prim.surface_properties(hit.coords, hit.index, hit.uv);
        assert!((props.st - Vec2::new(0.15, 0.05)).length() < 1e-5);
        assert_eq!(prim.eval_diffuse_color(props.st), Checkerboard::default().color_b);
        assert!((props.normal - Vec3::Z).length() < 1e-6);
    }
}
