//! Worker capability descriptor and self-benchmark (§3 `MachineInfo`, §4.7
//! step 1).

use std::time::Instant;

use raybun_core::{CameraDesc, Material, Primitive, Scene, Vec3};
use raybun_render::{render_standalone, State};

use crate::protocol::RegisterRequest;

/// A worker's capability advertisement, sent in `POST /api/register`.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineInfo {
    pub name: String,
    /// Benchmark score in `[0, 10]`; higher is faster.
    pub perf: f32,
    pub thread_count: u32,
    pub simd: bool,
}

impl MachineInfo {
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.clone(),
            perf: self.perf,
            thread_count: self.thread_count,
            simd: self.simd,
        }
    }
}

/// A small, fixed scene rendered single-threaded to derive `perf`. Not the
/// scene being distributed — purely a timing yardstick, same role as the
/// original's reference benchmark scene.
fn reference_scene() -> (Scene, State) {
    let camera_desc = CameraDesc {
        look_from: Vec3::ZERO,
        look_at: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, 1.0, 0.0),
        vfov_degrees: 50.0,
        aspect_ratio: 1.0,
        aperture: 0.0,
        focus_distance: 1.0,
    };
    let materials = vec![
        Material::Lambertian {
            albedo: Vec3::new(0.6, 0.2, 0.2),
        },
        Material::Metal {
            albedo: Vec3::new(0.8, 0.8, 0.8),
            fuzz: 0.1,
        },
        Material::Dielectric {
            etai_over_etat: 1.5,
        },
    ];
    let objects = vec![
        Primitive::Sphere {
            center: Vec3::new(0.0, -100.5, -1.0),
            radius: 100.0,
            mat_index: 0,
        },
        Primitive::Sphere {
            center: Vec3::new(-1.0, 0.0, -1.0),
            radius: 0.5,
            mat_index: 1,
        },
        Primitive::Sphere {
            center: Vec3::new(1.0, 0.0, -1.0),
            radius: 0.5,
            mat_index: 2,
        },
    ];
    let scene = Scene::build(materials, objects, &camera_desc, "{}".to_string()).unwrap();
    let state = State::new(128, 128, 16, 8);
    (scene, state)
}

/// Run the tile loop on the reference scene, single-threaded, and derive a
/// perf score by linear interpolation: 1s → 10, 10s → 0 (§4.7), clamped to
/// `[0, 10]`.
pub fn benchmark_self(name: impl Into<String>) -> MachineInfo {
    let (scene, mut state) = reference_scene();
    let start = Instant::now();
    render_standalone(&scene, &mut state, 1, 0);
    let elapsed = start.elapsed().as_secs_f32();

    let perf = if elapsed <= 1.0 {
        10.0
    } else if elapsed >= 10.0 {
        0.0
    } else {
        10.0 - (elapsed - 1.0) * (10.0 / 9.0)
    };

    MachineInfo {
        name: name.into(),
        perf: perf.clamp(0.0, 10.0),
        thread_count: raybun_render::default_thread_count() as u32,
        simd: cfg!(target_feature = "sse2") || cfg!(target_feature = "neon"),
    }
}
