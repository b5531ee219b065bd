use crate::camera::{Camera, CameraDesc};
use crate::error::CoreError;
use crate::hittable::Bvh;
use crate::material::{scatter, HitRecord, Material};
use crate::primitive::Primitive;
use crate::ray::Ray;

/// `tmin` fixed per §4.1 to avoid shadow acne at the originating surface.
pub const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Fixed dark-grey background colour returned when a ray escapes the scene.
pub const BACKGROUND: crate::material::Colour = crate::material::Colour {
    x: 0.1,
    y: 0.1,
    z: 0.1,
};

/// A fully loaded, immutable scene: materials, primitives (boundable ones in
/// a BVH, infinite planes in a side list per §4.2/§9), camera, and the
/// canonical JSON text its CRC-32 token is computed over.
pub struct Scene {
    materials: Vec<Material>,
    /// Boundable primitives, in the order indexed by the BVH.
    bvh_primitives: Vec<Primitive>,
    bvh: Option<Bvh>,
    /// Infinite-extent primitives (planes), tested after the BVH.
    infinite_primitives: Vec<Primitive>,
    camera: Camera,
    scene_json: String,
    scene_crc: u32,
}

impl Scene {
    pub fn build(
        materials: Vec<Material>,
        primitives: Vec<Primitive>,
        camera_desc: &CameraDesc,
        scene_json: String,
    ) -> Result<Self, CoreError> {
        for mat in &materials {
            mat.validate()?;
        }

        let mut bvh_primitives = Vec::new();
        let mut infinite_primitives = Vec::new();
        for p in primitives {
            if let Err(err) = p.validate() {
                tracing::warn!(%err, "skipping invalid primitive");
                continue;
            }
            let idx = p.mat_index();
            if idx >= materials.len() {
                let err = CoreError::MaterialIndexOutOfRange {
                    index: idx,
                    len: materials.len(),
                };
                tracing::warn!(%err, "skipping primitive");
                continue;
            }
            if p.bounding_box().is_some() {
                bvh_primitives.push(p);
            } else {
                infinite_primitives.push(p);
            }
        }
        let bvh = Bvh::build(&bvh_primitives);
        let camera = Camera::build(camera_desc)?;
        let scene_crc = crc32fast::hash(scene_json.as_bytes());

        Ok(Self {
            materials,
            bvh_primitives,
            bvh,
            infinite_primitives,
            camera,
            scene_json,
            scene_crc,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene_json(&self) -> &str {
        &self.scene_json
    }

    pub fn scene_crc(&self) -> u32 {
        self.scene_crc
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    /// Nearest hit across the BVH and the infinite-primitive side list.
    pub fn hit(&self, ray: &Ray, tmin: f32, tmax: f32) -> Option<HitRecord> {
        let mut closest = tmax;
        let mut result = self
            .bvh
            .as_ref()
            .and_then(|bvh| bvh.hit(&self.bvh_primitives, ray, tmin, closest));
        if let Some(rec) = &result {
            closest = rec.t;
        }
        for prim in &self.infinite_primitives {
            if let Some(rec) = prim.hit(ray, tmin, closest) {
                closest = rec.t;
                result = Some(rec);
            }
        }
        result
    }
}

/// `ray_colour` per §4.4: recursive path-trace with a fixed depth bound and
/// no Russian roulette.
pub fn ray_colour(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    rng: &mut crate::rng::Rng,
) -> crate::material::Colour {
    if depth == 0 {
        return crate::material::Colour::ZERO;
    }
    let Some(hit) = scene.hit(ray, SHADOW_ACNE_EPSILON, f32::INFINITY) else {
        return BACKGROUND;
    };

    let material = scene.material(hit.mat_index);
    let emission = material.emission();

    match scatter(material, &hit, ray, rng) {
        None => emission,
        Some((attenuation, scattered)) => {
            emission + attenuation.comp_mul(ray_colour(&scattered, scene, depth - 1, rng))
        }
    }
}
