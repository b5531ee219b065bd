//! Scene-JSON loading (§6 schema). This is the "external collaborator"
//! surface spec.md explicitly places outside the core engine; grounded in
//! the original's `scene_loader.c`, whose field names (`corner`, `p1`..`p3`,
//! `refraction_index`, `material`) this mirrors so existing scene files stay
//! loadable.

use serde_json::Value;
use tracing::warn;

use raybun_core::{CameraDesc, Material, Primitive, Scene, Vec3, Vertex};
use raybun_render::State;

use crate::error::AppError;

/// Parse minified or pretty scene JSON text into a [`Scene`] and [`State`].
/// `scene_json` is retained verbatim on the returned `Scene` for the CRC
/// token served at `GET /api/scene`.
pub fn load_scene(scene_json: &str) -> Result<(Scene, State), AppError> {
    let root: Value = serde_json::from_str(scene_json)?;

    let config = root
        .get("config")
        .ok_or(AppError::MissingSection("config"))?;
    let width = parse_u32(config, "width", 400);
    let height = parse_u32(config, "height", 225);
    let samples_per_pixel = parse_u32(config, "samples_per_pixel", 10);
    let max_depth = parse_u32(config, "max_depth", 10);

    let camera_desc = parse_camera(root.get("camera"), width, height);

    let materials = parse_materials(root.get("materials"));
    let primitives = parse_objects(root.get("objects"), materials.len());

    let scene = Scene::build(materials, primitives, &camera_desc, scene_json.to_string())?;
    let state = State::new(width, height, samples_per_pixel, max_depth);
    Ok((scene, state))
}

/// Reads `scene_path` from disk and loads it, per the `standalone`/`master`
/// CLI subcommands.
pub fn load_scene_file(scene_path: &std::path::Path) -> Result<(Scene, State), AppError> {
    let text = std::fs::read_to_string(scene_path).map_err(|source| AppError::SceneFile {
        path: scene_path.display().to_string(),
        source,
    })?;
    load_scene(&text)
}

fn parse_camera(cam: Option<&Value>, width: u32, height: u32) -> CameraDesc {
    let default_aspect = width as f32 / height.max(1) as f32;
    let Some(cam) = cam else {
        warn!("camera: section missing, using defaults");
        return CameraDesc {
            look_from: Vec3::new(0.0, 0.0, -5.0),
            look_at: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            vfov_degrees: 60.0,
            aspect_ratio: default_aspect,
            aperture: 0.0,
            focus_distance: 1.0,
        };
    };

    let position = parse_vec3(cam.get("position"), "camera.position", Vec3::new(0.0, 0.0, -5.0));
    let look_at = parse_vec3(cam.get("look_at"), "camera.look_at", Vec3::ZERO);
    let up = parse_vec3(cam.get("up"), "camera.up", Vec3::new(0.0, 1.0, 0.0)).normalize();
    let fov = parse_f32(cam, "fov", 60.0);
    let defocus_angle_deg = parse_f32(cam, "defocus_angle", 0.0);
    let focus_dist = parse_f32(cam, "focus_dist", 1.0);
    let aspect_ratio = cam
        .get("aspect_ratio")
        .and_then(Value::as_str)
        .and_then(parse_aspect_fraction)
        .unwrap_or(default_aspect);

    // The source expresses the defocus disk as an angle (§4.5:
    // `defocus_radius = focus_dist * tan(defocus_angle/2)`); `Camera::build`
    // here takes the disk diameter directly, so convert once at load time.
    let aperture = 2.0 * focus_dist * (defocus_angle_deg.to_radians() / 2.0).tan();

    CameraDesc {
        look_from: position,
        look_at,
        up,
        vfov_degrees: fov,
        aspect_ratio,
        aperture,
        focus_distance: focus_dist,
    }
}

fn parse_aspect_fraction(s: &str) -> Option<f32> {
    let (n, d) = s.split_once('/')?;
    let n: f32 = n.trim().parse().ok()?;
    let d: f32 = d.trim().parse().ok()?;
    if d == 0.0 {
        None
    } else {
        Some(n / d)
    }
}

fn parse_materials(materials: Option<&Value>) -> Vec<Material> {
    let Some(Value::Array(items)) = materials else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|m| {
            let ty = m.get("type").and_then(Value::as_str)?;
            match ty {
                "lambertian" => Some(Material::Lambertian {
                    albedo: parse_vec3(m.get("albedo"), "material.albedo", Vec3::ONE),
                }),
                "metal" => Some(Material::Metal {
                    albedo: parse_vec3(m.get("albedo"), "material.albedo", Vec3::ONE),
                    fuzz: parse_f32(m, "fuzz", 0.0).clamp(0.0, 1.0),
                }),
                "dielectric" => Some(Material::Dielectric {
                    etai_over_etat: parse_f32(m, "refraction_index", 1.0),
                }),
                "emissive" => Some(Material::Emissive {
                    emission: parse_vec3(m.get("emission"), "material.emission", Vec3::ZERO),
                }),
                other => {
                    warn!(ty = other, "material: unknown type, skipping");
                    None
                }
            }
        })
        .collect()
}

fn parse_objects(objects: Option<&Value>, material_count: usize) -> Vec<Primitive> {
    let Some(objects) = objects else {
        warn!("objects: section missing");
        return Vec::new();
    };
    let mut primitives = Vec::new();

    for s in array_field(objects, "sphere") {
        let Some(mat_index) = parse_mat_index(s, material_count, "sphere.material") else {
            continue;
        };
        primitives.push(Primitive::Sphere {
            center: parse_vec3(s.get("center"), "sphere.center", Vec3::ZERO),
            radius: parse_f32(s, "radius", 0.0),
            mat_index,
        });
    }

    for p in array_field(objects, "plane") {
        let Some(mat_index) = parse_mat_index(p, material_count, "plane.material") else {
            continue;
        };
        primitives.push(Primitive::Plane {
            normal: parse_vec3(p.get("normal"), "plane.normal", Vec3::new(0.0, 1.0, 0.0))
                .normalize(),
            point: parse_vec3(p.get("point"), "plane.point", Vec3::ZERO),
            mat_index,
        });
    }

    for t in array_field(objects, "triangle") {
        let Some(mat_index) = parse_mat_index(t, material_count, "triangle.material") else {
            continue;
        };
        let p1 = parse_vec3(t.get("p1"), "triangle.p1", Vec3::ZERO);
        let p2 = parse_vec3(t.get("p2"), "triangle.p2", Vec3::ZERO);
        let p3 = parse_vec3(t.get("p3"), "triangle.p3", Vec3::ZERO);
        primitives.push(Primitive::Triangle {
            v0: Vertex::from_position(p1),
            v1: Vertex::from_position(p2),
            v2: Vertex::from_position(p3),
            mat_index,
        });
    }

    for q in array_field(objects, "quad") {
        let Some(mat_index) = parse_mat_index(q, material_count, "quad.material") else {
            continue;
        };
        primitives.push(Primitive::Quad {
            q: parse_vec3(q.get("corner"), "quad.corner", Vec3::ZERO),
            u: parse_vec3(q.get("u"), "quad.u", Vec3::ZERO),
            v: parse_vec3(q.get("v"), "quad.v", Vec3::ZERO),
            mat_index,
        });
    }

    for b in array_field(objects, "boxes") {
        let Some(mat_index) = parse_mat_index(b, material_count, "box.material") else {
            continue;
        };
        let a = parse_vec3(b.get("a"), "box.a", Vec3::ZERO);
        let c = parse_vec3(b.get("b"), "box.b", Vec3::ZERO);
        primitives.extend(box_to_quads(a, c, mat_index));
    }

    for m in array_field(objects, "models") {
        let file = m.get("file").and_then(Value::as_str).unwrap_or("<unknown>");
        warn!(file, "models: OBJ loading is not implemented, skipping entry");
    }

    primitives
}

fn array_field<'a>(objects: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    objects
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Six outward-facing quads for an axis-aligned box spanning corners `a`/`b`
/// (order-independent), matching the original's `add_box`.
fn box_to_quads(a: Vec3, b: Vec3, mat_index: usize) -> Vec<Primitive> {
    let min = Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
    let max = Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    let quad = |q: Vec3, u: Vec3, v: Vec3| Primitive::Quad { q, u, v, mat_index };

    vec![
        quad(Vec3::new(min.x, min.y, max.z), dy, dx),                 // front
        quad(Vec3::new(max.x, min.y, max.z), dy, -dz),                 // right
        quad(Vec3::new(max.x, min.y, min.z), dy, -dx),                 // back
        quad(Vec3::new(min.x, min.y, min.z), dy, dz),                  // left
        quad(Vec3::new(min.x, max.y, max.z), -dz, dx),                 // top
        quad(Vec3::new(min.x, min.y, min.z), dz, dx),                  // bottom
    ]
}

fn parse_mat_index(node: &Value, material_count: usize, ctx: &str) -> Option<usize> {
    let idx = node.get("material").and_then(Value::as_i64)?;
    if idx < 0 || idx as usize >= material_count {
        warn!(ctx, idx, "invalid material index, skipping entity");
        return None;
    }
    Some(idx as usize)
}

fn parse_vec3(node: Option<&Value>, ctx: &str, fallback: Vec3) -> Vec3 {
    let Some(Value::Array(arr)) = node else {
        warn!(ctx, "expected array[3], using default");
        return fallback;
    };
    if arr.len() != 3 {
        warn!(ctx, "expected array[3], using default");
        return fallback;
    }
    let get = |i: usize| arr[i].as_f64().map(|v| v as f32);
    match (get(0), get(1), get(2)) {
        (Some(x), Some(y), Some(z)) => Vec3::new(x, y, z),
        _ => {
            warn!(ctx, "non-numeric component, using default");
            fallback
        }
    }
}

fn parse_f32(node: &Value, key: &str, fallback: f32) -> f32 {
    node.get(key)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(fallback)
}

fn parse_u32(node: &Value, key: &str, fallback: u32) -> u32 {
    node.get(key)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(fallback)
}
