use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::vec3::Vec3;

/// Camera parameters as they appear in scene JSON. `Camera::build` derives
/// the orthonormal basis and viewport vectors used at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDesc {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub vfov_degrees: f32,
    pub aspect_ratio: f32,
    pub aperture: f32,
    pub focus_distance: f32,
}

/// A fully derived pinhole camera with an optional thin-lens defocus disk.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    pub fn build(desc: &CameraDesc) -> Result<Self, CoreError> {
        if desc.aspect_ratio <= 0.0 || desc.vfov_degrees <= 0.0 || desc.focus_distance <= 0.0 {
            return Err(CoreError::InvalidCamera {
                reason: "aspect ratio, vfov, and focus distance must be positive".to_string(),
            });
        }

        let theta = desc.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = desc.aspect_ratio * viewport_height;

        let w = (desc.look_from - desc.look_at).normalize();
        if w.near_zero() {
            return Err(CoreError::InvalidCamera {
                reason: "look_from and look_at must differ".to_string(),
            });
        }
        let u = desc.up.cross(w).normalize();
        let v = w.cross(u);

        let origin = desc.look_from;
        let horizontal = u * (viewport_width * desc.focus_distance);
        let vertical = v * (viewport_height * desc.focus_distance);
        let lower_left = origin - horizontal / 2.0 - vertical / 2.0 - w * desc.focus_distance;

        Ok(Self {
            origin,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: desc.aperture / 2.0,
        })
    }

    /// A ray through normalized viewport coordinates `(s, t)` in `[0, 1]`,
    /// perturbed by the defocus disk when `lens_radius > 0`.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut Rng) -> Ray {
        let rd = rng.random_in_unit_disk() * self.lens_radius;
        let offset = self.u * rd.x + self.v * rd.y;
        let origin = self.origin + offset;
        let direction = self.lower_left + self.horizontal * s + self.vertical * t - origin;
        Ray::new(origin, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> CameraDesc {
        CameraDesc {
            look_from: Vec3::new(0.0, 0.0, 1.0),
            look_at: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            vfov_degrees: 90.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }

    #[test]
    fn center_ray_points_toward_look_at() {
        let cam = Camera::build(&desc()).unwrap();
        let mut rng = Rng::new(1);
        let ray = cam.get_ray(0.5, 0.5, &mut rng);
        // direction should be roughly -z (toward the origin from z=1)
        assert!(ray.direction.normalize().z < -0.9);
    }

    #[test]
    fn rejects_degenerate_look_direction() {
        let mut d = desc();
        d.look_at = d.look_from;
        assert!(Camera::build(&d).is_err());
    }

    #[test]
    fn rejects_non_positive_fov() {
        let mut d = desc();
        d.vfov_degrees = 0.0;
        assert!(Camera::build(&d).is_err());
    }

    #[test]
    fn zero_aperture_has_no_lens_jitter() {
        let cam = Camera::build(&desc()).unwrap();
        let mut rng = Rng::new(3);
        let a = cam.get_ray(0.2, 0.3, &mut rng);
        let b = cam.get_ray(0.2, 0.3, &mut rng);
        assert_eq!(a.origin, b.origin);
    }
}
