use criterion::{criterion_group, criterion_main, Criterion};

use raybun_core::{CameraDesc, Material, Primitive, Scene, Vec3};
use raybun_render::{render_standalone, State};

fn sample_scene(aspect: f32) -> Scene {
    let camera_desc = CameraDesc {
        look_from: Vec3::ZERO,
        look_at: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, 1.0, 0.0),
        vfov_degrees: 60.0,
        aspect_ratio: aspect,
        aperture: 0.0,
        focus_distance: 1.0,
    };
    let materials = vec![
        Material::Lambertian {
            albedo: Vec3::new(0.8, 0.2, 0.2),
        },
        Material::Metal {
            albedo: Vec3::new(0.9, 0.9, 0.9),
            fuzz: 0.05,
        },
    ];
    let objects = vec![
        Primitive::Sphere {
            center: Vec3::new(0.0, 0.0, -3.0),
            radius: 1.0,
            mat_index: 0,
        },
        Primitive::Sphere {
            center: Vec3::new(-2.2, 0.0, -3.5),
            radius: 1.0,
            mat_index: 1,
        },
    ];
    Scene::build(materials, objects, &camera_desc, "{}".to_string()).unwrap()
}

fn bench_full_frame_render(c: &mut Criterion) {
    let scene = sample_scene(640.0 / 480.0);

    c.bench_function("full_frame_640x480_spp4", |b| {
        b.iter(|| {
            let mut state = State::new(640, 480, 4, 6);
            render_standalone(&scene, &mut state, 4, 1);
        });
    });
}

fn bench_single_tile(c: &mut Criterion) {
    let scene = sample_scene(1.0);

    c.bench_function("single_tile_64x64_spp8", |b| {
        b.iter(|| {
            let mut state = State::new(64, 64, 8, 6);
            render_standalone(&scene, &mut state, 1, 1);
        });
    });
}

criterion_group!(benches, bench_full_frame_render, bench_single_tile);
criterion_main!(benches);
