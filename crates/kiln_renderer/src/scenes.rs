//! Built-in demo scenes with matching render settings.

use crate::light::PointLight;
use crate::material::Checkerboard;
use crate::{Color, IntegratorKind, Material, RenderConfig, Scene, Sphere, Triangle, TriangleMesh};
use kiln_core::{Mesh, MeshResult};
use kiln_math::Vec3;
use std::sync::Arc;

/// Two triangles covering the quad `a b c d` (corners in order).
fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: &Arc<Material>) -> [Triangle; 2] {
    [
        Triangle::new(a, b, c, Arc::clone(material)),
        Triangle::new(a, c, d, Arc::clone(material)),
    ]
}

/// Closed block standing on y = 0 with the given top outline.
fn block(top: [(f32, f32); 4], height: f32, material: Arc<Material>) -> MeshResult<TriangleMesh> {
    let mut positions: Vec<Vec3> = top
        .iter()
        .map(|&(x, z)| Vec3::new(x, height, z))
        .collect();
    positions.extend(top.iter().map(|&(x, z)| Vec3::new(x, 0.0, z)));

    let mut indices = vec![0, 1, 2, 0, 2, 3];
    for i in 0..4u32 {
        let j = (i + 1) % 4;
        // bottom i, bottom j, top j, top i
        indices.extend_from_slice(&[i + 4, j + 4, j, i + 4, j, i]);
    }

    let mesh = Mesh::new(positions, indices)?;
    Ok(TriangleMesh::new(&mesh, material))
}

/// Cornell box lit by an emissive ceiling patch, for the path tracer.
pub fn cornell_box() -> MeshResult<Scene> {
    let red = Arc::new(Material::diffuse(Color::new(0.63, 0.065, 0.05)));
    let green = Arc::new(Material::diffuse(Color::new(0.14, 0.45, 0.091)));
    let white = Arc::new(Material::diffuse(Color::new(0.725, 0.71, 0.68)));
    let emission = 8.0 * Color::new(0.747 + 0.058, 0.747 + 0.258, 0.747)
        + 15.6 * Color::new(0.740 + 0.287, 0.740 + 0.160, 0.740)
        + 18.4 * Color::new(0.737 + 0.642, 0.737 + 0.159, 0.737);
    let light = Arc::new(Material::emissive(Color::splat(0.65), emission));

    let walls = [
        // floor
        quad(
            Vec3::new(552.8, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(549.6, 0.0, 559.2),
            &white,
        ),
        // ceiling
        quad(
            Vec3::new(556.0, 548.8, 0.0),
            Vec3::new(556.0, 548.8, 559.2),
            Vec3::new(0.0, 548.8, 559.2),
            Vec3::new(0.0, 548.8, 0.0),
            &white,
        ),
        // back
        quad(
            Vec3::new(549.6, 0.0, 559.2),
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(0.0, 548.8, 559.2),
            Vec3::new(556.0, 548.8, 559.2),
            &white,
        ),
        // left
        quad(
            Vec3::new(552.8, 0.0, 0.0),
            Vec3::new(549.6, 0.0, 559.2),
            Vec3::new(556.0, 548.8, 559.2),
            Vec3::new(556.0, 548.8, 0.0),
            &red,
        ),
        // right
        quad(
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 548.8, 0.0),
            Vec3::new(0.0, 548.8, 559.2),
            &green,
        ),
        // light, just below the ceiling
        quad(
            Vec3::new(343.0, 548.7, 227.0),
            Vec3::new(343.0, 548.7, 332.0),
            Vec3::new(213.0, 548.7, 332.0),
            Vec3::new(213.0, 548.7, 227.0),
            &light,
        ),
    ];

    let short_block = block(
        [(130.0, 65.0), (82.0, 225.0), (240.0, 272.0), (290.0, 114.0)],
        165.0,
        Arc::clone(&white),
    )?;
    let tall_block = block(
        [(423.0, 247.0), (265.0, 296.0), (314.0, 456.0), (472.0, 406.0)],
        330.0,
        white,
    )?;

    let mut builder = Scene::builder().add(short_block).add(tall_block);
    for triangle in walls.into_iter().flatten() {
        builder = builder.add(triangle);
    }
    Ok(builder.build())
}

/// Render settings framing [`cornell_box`].
pub fn cornell_box_config() -> RenderConfig {
    RenderConfig {
        width: 256,
        height: 256,
        fov: 40.0,
        eye: Vec3::new(278.0, 273.0, -800.0),
        look_at: Vec3::new(278.0, 273.0, 0.0),
        up: Vec3::Y,
        samples_per_pixel: 64,
        integrator: IntegratorKind::Path,
        epsilon: 1e-2,
        ..Default::default()
    }
}

/// Diffuse and glass spheres over a checkerboard floor, lit by two point
/// lights, for the Whitted estimator.
pub fn whitted_showcase() -> MeshResult<Scene> {
    let diffuse = Arc::new(
        Material::diffuse(Color::splat(0.8)).with_diffuse_color(Color::new(0.6, 0.7, 0.8)),
    );
    let glass = Arc::new(Material::glass(1.5));
    let checker = Arc::new(Material::default().with_texture(Checkerboard::default()));

    let plane = Mesh::new_with_uvs(
        vec![
            Vec3::new(-5.0, -3.0, -6.0),
            Vec3::new(5.0, -3.0, -6.0),
            Vec3::new(5.0, -3.0, -16.0),
            Vec3::new(-5.0, -3.0, -16.0),
        ],
        vec![0, 1, 3, 1, 2, 3],
        Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
    )?;

    Ok(Scene::builder()
        .add(Sphere::new(Vec3::new(-1.0, 0.0, -12.0), 2.0, diffuse))
        .add(Sphere::new(Vec3::new(0.5, -0.5, -8.0), 1.5, glass))
        .add(TriangleMesh::new(&plane, checker))
        .add_light(PointLight::new(Vec3::new(-20.0, 70.0, 20.0), Color::splat(0.5)))
        .add_light(PointLight::new(Vec3::new(30.0, 50.0, -12.0), Color::splat(0.5)))
        .build())
}

/// Render settings framing [`whitted_showcase`].
pub fn whitted_showcase_config() -> RenderConfig {
    RenderConfig {
        width: 320,
        height: 240,
        fov: 90.0,
        eye: Vec3::ZERO,
        look_at: Vec3::NEG_Z,
        up: Vec3::Y,
        samples_per_pixel: 1,
        integrator: IntegratorKind::Whitted,
        max_depth: 5,
        epsilon: 1e-4,
        ..Default::default()
    }
}

/// Closed white unit cube with a small ceiling light, built from loose
/// triangles so that the linear traversal never touches a BVH.
pub fn enclosed_box() -> Scene {
    let white = Arc::new(Material::diffuse(Color::splat(0.7)));
    let light = Arc::new(Material::emissive(Color::splat(0.7), Color::splat(10.0)));

    let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
    let faces = [
        quad(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0), &white),
        quad(p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0), &white),
        quad(p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0), &white),
        quad(p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0), &white),
        quad(p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0), &white),
        quad(p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0), &white),
        quad(p(0.35, 0.99, 0.35), p(0.65, 0.99, 0.35), p(0.65, 0.99, 0.65), p(0.35, 0.99, 0.65), &light),
    ];

    faces
        .into_iter()
        .flatten()
        .fold(Scene::builder(), |builder, triangle| builder.add(triangle))
        .build()
}

/// Render settings for [`enclosed_box`], with the camera inside the box.
pub fn enclosed_box_config() -> RenderConfig {
    RenderConfig {
        width: 16,
        height: 16,
        fov: 60.0,
        eye: Vec3::new(0.45, 0.52, 0.05),
        look_at: Vec3::new(0.45, 0.52, 1.0),
        up: Vec3::Y,
        samples_per_pixel: 64,
        integrator: IntegratorKind::Path,
        epsilon: 1e-4,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::Object;
    use crate::renderer::render;
    use kiln_math::Ray;

    #[test]
    fn test_cornell_box_layout() {
        let scene = cornell_box().unwrap();
        // 2 blocks + 12 wall and light triangles
        assert_eq!(scene.objects().len(), 14);
        // Light patch: 130 x 105
        assert!((scene.emissive_area() - 130.0 * 105.0).abs() < 1.0);

        let bound = scene.world_bound();
        assert!(bound.inside(Vec3::new(278.0, 273.0, 279.6)));

        // Looking up from the floor centre at the light
        let hit = scene.intersect(&Ray::new(Vec3::new(278.0, 1.0, 279.6), Vec3::Y));
        assert!(hit.happened);
        assert!(hit.material.is_some_and(|m| m.has_emission()));
    }

    #[test]
    fn test_blocks_are_closed() {
        let mesh = block(
            [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            1.0,
            Arc::new(Material::default()),
        )
        .unwrap();
        assert_eq!(mesh.triangle_count(), 10);
        // Top plus four unit sides
        assert!((mesh.area() - 5.0).abs() < 1e-5);

        // Rays from inside hit a wall in every direction but down
        let origin = Vec3::new(0.4, 0.3, 0.6);
        for (dir, distance) in [
            (Vec3::X, 0.6),
            (Vec3::NEG_X, 0.4),
            (Vec3::Z, 0.4),
            (Vec3::NEG_Z, 0.6),
            (Vec3::Y, 0.7),
        ] {
            let hit = mesh.get_intersection(&Ray::new(origin, dir));
            assert!(hit.happened, "no wall towards {:?}", dir);
            assert!((hit.distance - distance).abs() < 1e-5);
        }
        assert!(!mesh.get_intersection(&Ray::new(origin, Vec3::NEG_Y)).happened);
    }

    #[test]
    fn test_whitted_showcase_renders() {
        let scene = whitted_showcase().unwrap();
        assert_eq!(scene.lights().len(), 2);

        let config = RenderConfig {
            width: 32,
            height: 24,
            ..whitted_showcase_config()
        };
        let image = render(&scene, &config).unwrap();
        assert!(image.pixels.iter().all(|c| c.is_finite()));
        assert!(image.pixels.iter().any(|c| *c != config.background));
    }

    #[test]
    fn test_enclosed_box_is_closed() {
        let scene = enclosed_box();
        let config = enclosed_box_config();
        let camera = config.camera();
        for j in 0..config.height {
            for i in 0..config.width {
                assert!(scene.intersect(&camera.get_ray(i, j)).happened);
            }
        }
    }
}
