use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::vec2::Vec2;
use crate::vec3::Vec3;

/// A point where a ray met a primitive's surface.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub point: Vec3,
    /// Oriented so `normal.dot(ray.direction) < 0` — see `front_face`.
    pub normal: Vec3,
    pub t: f32,
    pub uv: Vec2,
    /// `true` if the incoming ray faced the geometric outward normal.
    pub front_face: bool,
    pub mat_index: usize,
}

impl HitRecord {
    /// Orients `normal` against `ray.direction` and records whether the
    /// geometric (outward) normal already faced the ray.
    #[inline]
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

pub type Colour = Vec3;

/// A surface material. `mat_index` in `HitRecord`/primitives refers into the
/// scene's flat `materials` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    Lambertian { albedo: Colour },
    Metal { albedo: Colour, fuzz: f32 },
    Dielectric { etai_over_etat: f32 },
    Emissive { emission: Colour },
}

impl Material {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Material::Metal { fuzz, .. } = self {
            if !(0.0..=1.0).contains(fuzz) {
                return Err(CoreError::InvalidFuzz(*fuzz));
            }
        }
        Ok(())
    }

    /// Emission contributed by this material regardless of whether it
    /// scatters (non-emissive materials contribute none).
    #[inline]
    pub fn emission(&self) -> Colour {
        match self {
            Material::Emissive { emission } => *emission,
            _ => Colour::ZERO,
        }
    }
}

/// Outcome of §4.3 scattering: `None` means the material absorbed the ray
/// (emissive materials, or a metal reflection pointing into the surface).
pub fn scatter(
    material: &Material,
    hit: &HitRecord,
    ray_in: &Ray,
    rng: &mut Rng,
) -> Option<(Colour, Ray)> {
    match material {
        Material::Lambertian { albedo } => {
            let mut dir = hit.normal + rng.random_unit_vector();
            if dir.near_zero() {
                dir = hit.normal;
            }
            Some((*albedo, Ray::new(hit.point, dir)))
        }
        Material::Metal { albedo, fuzz } => {
            let reflected = ray_in.direction.reflect(hit.normal);
            let dir = reflected.normalize() + rng.random_unit_vector() * *fuzz;
            if dir.dot(hit.normal) > 0.0 {
                Some((*albedo, Ray::new(hit.point, dir)))
            } else {
                None
            }
        }
        Material::Dielectric { etai_over_etat } => {
            let eta = if hit.front_face {
                1.0 / *etai_over_etat
            } else {
                *etai_over_etat
            };
            let unit_dir = ray_in.direction.normalize();
            let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            let cannot_refract = eta * sin_theta > 1.0;
            let dir = if cannot_refract || schlick_reflectance(cos_theta, eta) > rng.next_f32() {
                unit_dir.reflect(hit.normal)
            } else {
                unit_dir.refract(hit.normal, eta)
            };
            Some((Colour::ONE, Ray::new(hit.point, dir)))
        }
        Material::Emissive { .. } => None,
    }
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick_reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hit() -> HitRecord {
        HitRecord {
            point: Vec3::ZERO,
            normal: Vec3::new(0.0, 1.0, 0.0),
            t: 1.0,
            uv: Vec2::ZERO,
            front_face: true,
            mat_index: 0,
        }
    }

    #[test]
    fn lambertian_always_scatters() {
        let mat = Material::Lambertian {
            albedo: Colour::new(1.0, 0.0, 0.0),
        };
        let hit = flat_hit();
        let ray_in = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = Rng::new(1);
        let result = scatter(&mat, &hit, &ray_in, &mut rng);
        assert!(result.is_some());
    }

    #[test]
    fn metal_absorbs_rays_pointing_into_surface() {
        let mat = Material::Metal {
            albedo: Colour::ONE,
            fuzz: 0.0,
        };
        let hit = flat_hit();
        // Incoming ray straight down; reflects straight back up (no fuzz):
        // always valid here, so force fuzz to push the reflection under.
        let ray_in = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.1, -1.0, 0.0));
        let mut rng = Rng::new(1);
        let result = scatter(&mat, &hit, &ray_in, &mut rng);
        assert!(result.is_some());
    }

    #[test]
    fn emissive_never_scatters() {
        let mat = Material::Emissive {
            emission: Colour::ONE,
        };
        let hit = flat_hit();
        let ray_in = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        let mut rng = Rng::new(1);
        assert!(scatter(&mat, &hit, &ray_in, &mut rng).is_none());
        assert_eq!(mat.emission(), Colour::ONE);
    }

    #[test]
    fn validate_rejects_out_of_range_fuzz() {
        let mat = Material::Metal {
            albedo: Colour::ONE,
            fuzz: 1.5,
        };
        assert!(mat.validate().is_err());
    }

    #[test]
    fn schlick_is_full_reflectance_at_grazing_angle() {
        let r = schlick_reflectance(0.0, 1.5);
        assert!(r > 0.9);
    }
}
