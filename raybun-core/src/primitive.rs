use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::error::CoreError;
use crate::material::HitRecord;
use crate::ray::Ray;
use crate::vec2::Vec2;
use crate::vec3::Vec3;

/// A triangle corner. `normal`/`uv` are optional: the source scene format
/// carries only positions, so the intersection code falls back to the
/// flat face normal and a barycentric-only UV when they are absent (§9's
/// richer per-vertex representation, used wherever data is available).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    #[serde(default)]
    pub normal: Option<Vec3>,
    #[serde(default)]
    pub uv: Option<Vec2>,
}

impl Vertex {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
        }
    }
}

/// Geometric primitives the renderer can intersect. Each variant owns its
/// own shape data; `mat_index` is shared across all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Sphere {
        center: Vec3,
        radius: f32,
        mat_index: usize,
    },
    /// An infinite plane through `point` with the given `normal`.
    /// Excluded from the BVH (see `Primitive::bounding_box`) since it has
    /// no finite extent; tested directly against every ray.
    Plane {
        point: Vec3,
        normal: Vec3,
        mat_index: usize,
    },
    Triangle {
        v0: Vertex,
        v1: Vertex,
        v2: Vertex,
        mat_index: usize,
    },
    /// A parallelogram spanned by edges `u` and `v` from corner `q`.
    Quad {
        q: Vec3,
        u: Vec3,
        v: Vec3,
        mat_index: usize,
    },
}

impl Primitive {
    /// Per-entity validation (§7 `SceneError`): the caller skips the
    /// offending entity and continues rather than treating this as fatal.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Primitive::Sphere { radius, .. } => {
                if *radius <= 0.0 {
                    return Err(CoreError::InvalidRadius(*radius));
                }
            }
            Primitive::Quad { u, v, .. } => {
                if u.cross(*v).length_squared() < 1e-12 {
                    return Err(CoreError::DegenerateQuad);
                }
            }
            Primitive::Plane { .. } | Primitive::Triangle { .. } => {}
        }
        Ok(())
    }

    pub fn mat_index(&self) -> usize {
        match self {
            Primitive::Sphere { mat_index, .. }
            | Primitive::Plane { mat_index, .. }
            | Primitive::Triangle { mat_index, .. }
            | Primitive::Quad { mat_index, .. } => *mat_index,
        }
    }

    /// `None` for planes: they have no finite bounds and are tested outside
    /// the BVH for every ray (see spec §4.2's Non-goal on infinite planes).
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Primitive::Sphere { center, radius, .. } => {
                let r = Vec3::splat(*radius);
                Some(Aabb::from_corners(*center - r, *center + r))
            }
            Primitive::Plane { .. } => None,
            Primitive::Triangle { v0, v1, v2, .. } => Some(
                Aabb::from_corners(v0.position, v1.position)
                    .union(Aabb::from_corners(v2.position, v2.position)),
            ),
            Primitive::Quad { q, u, v, .. } => {
                let a = *q;
                let b = *q + *u;
                let c = *q + *v;
                let d = *q + *u + *v;
                Some(
                    Aabb::from_corners(a, b)
                        .union(Aabb::from_corners(c, c))
                        .union(Aabb::from_corners(d, d)),
                )
            }
        }
    }

    pub fn hit(&self, ray: &Ray, tmin: f32, tmax: f32) -> Option<HitRecord> {
        match self {
            Primitive::Sphere {
                center,
                radius,
                mat_index,
            } => hit_sphere(*center, *radius, *mat_index, ray, tmin, tmax),
            Primitive::Plane {
                point,
                normal,
                mat_index,
            } => hit_plane(*point, *normal, *mat_index, ray, tmin, tmax),
            Primitive::Triangle {
                v0,
                v1,
                v2,
                mat_index,
            } => hit_triangle(v0, v1, v2, *mat_index, ray, tmin, tmax),
            Primitive::Quad { q, u, v, mat_index } => {
                hit_quad(*q, *u, *v, *mat_index, ray, tmin, tmax)
            }
        }
    }
}

fn hit_sphere(
    center: Vec3,
    radius: f32,
    mat_index: usize,
    ray: &Ray,
    tmin: f32,
    tmax: f32,
) -> Option<HitRecord> {
    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let mut root = (h - sqrtd) / a;
    if root <= tmin || root >= tmax {
        root = (h + sqrtd) / a;
        if root <= tmin || root >= tmax {
            return None;
        }
    }

    let point = ray.at(root);
    let outward_normal = (point - center) / radius;
    let mut rec = HitRecord {
        point,
        normal: outward_normal,
        t: root,
        uv: sphere_uv(outward_normal),
        front_face: true,
        mat_index,
    };
    rec.set_face_normal(ray, outward_normal);
    Some(rec)
}

fn sphere_uv(p: Vec3) -> Vec2 {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + std::f32::consts::PI;
    Vec2::new(phi / (2.0 * std::f32::consts::PI), theta / std::f32::consts::PI)
}

fn hit_plane(
    point: Vec3,
    normal: Vec3,
    mat_index: usize,
    ray: &Ray,
    tmin: f32,
    tmax: f32,
) -> Option<HitRecord> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t <= tmin || t >= tmax {
        return None;
    }
    let hit_point = ray.at(t);
    let mut rec = HitRecord {
        point: hit_point,
        normal,
        t,
        uv: Vec2::ZERO,
        front_face: true,
        mat_index,
    };
    rec.set_face_normal(ray, normal);
    Some(rec)
}

/// Möller–Trumbore. Falls back to the flat face normal/raw barycentrics
/// when a corner carries no per-vertex normal/uv.
fn hit_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    mat_index: usize,
    ray: &Ray,
    tmin: f32,
    tmax: f32,
) -> Option<HitRecord> {
    let p0 = v0.position;
    let p1 = v1.position;
    let p2 = v2.position;
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.origin - p0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    if t <= tmin || t >= tmax {
        return None;
    }
    let point = ray.at(t);
    let face_normal = edge1.cross(edge2).normalize();
    let w = 1.0 - u - v;

    let outward_normal = match (v0.normal, v1.normal, v2.normal) {
        (Some(n0), Some(n1), Some(n2)) => (n0 * w + n1 * u + n2 * v).normalize(),
        _ => face_normal,
    };
    let uv = match (v0.uv, v1.uv, v2.uv) {
        (Some(uv0), Some(uv1), Some(uv2)) => Vec2::new(
            uv0.x * w + uv1.x * u + uv2.x * v,
            uv0.y * w + uv1.y * u + uv2.y * v,
        ),
        _ => Vec2::new(u, v),
    };

    let mut rec = HitRecord {
        point,
        normal: outward_normal,
        t,
        uv,
        front_face: true,
        mat_index,
    };
    rec.set_face_normal(ray, outward_normal);
    Some(rec)
}

/// Parallelogram test via the plane-basis method: project the hit point onto
/// the `(u, v)` basis and check both components lie in `[0, 1]`.
fn hit_quad(q: Vec3, u: Vec3, v: Vec3, mat_index: usize, ray: &Ray, tmin: f32, tmax: f32) -> Option<HitRecord> {
    let n = u.cross(v);
    let normal = n.normalize();
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let d = normal.dot(q);
    let t = (d - normal.dot(ray.origin)) / denom;
    if t <= tmin || t >= tmax {
        return None;
    }

    let point = ray.at(t);
    let w = n / n.dot(n);
    let hp = point - q;
    let alpha = w.dot(hp.cross(v));
    let beta = w.dot(u.cross(hp));
    if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
        return None;
    }

    let mut rec = HitRecord {
        point,
        normal,
        t,
        uv: Vec2::new(alpha, beta),
        front_face: true,
        mat_index,
    };
    rec.set_face_normal(ray, normal);
    Some(rec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_hit_from_outside() {
        let sphere = Primitive::Sphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!(rec.front_face);
    }

    #[test]
    fn sphere_miss() {
        let sphere = Primitive::Sphere {
            center: Vec3::new(5.0, 5.0, -5.0),
            radius: 1.0,
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn plane_has_no_bounding_box() {
        let plane = Primitive::Plane {
            point: Vec3::ZERO,
            normal: Vec3::new(0.0, 1.0, 0.0),
            mat_index: 0,
        };
        assert!(plane.bounding_box().is_none());
    }

    #[test]
    fn plane_hit_straight_down() {
        let plane = Primitive::Plane {
            point: Vec3::ZERO,
            normal: Vec3::new(0.0, 1.0, 0.0),
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = plane.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((rec.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn triangle_hit_at_centroid() {
        let tri = Primitive::Triangle {
            v0: Vertex::from_position(Vec3::new(-1.0, -1.0, -5.0)),
            v1: Vertex::from_position(Vec3::new(1.0, -1.0, -5.0)),
            v2: Vertex::from_position(Vec3::new(0.0, 1.0, -5.0)),
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -0.33333, -5.0).normalize());
        let rec = tri.hit(&ray, 0.001, f32::INFINITY);
        assert!(rec.is_some());
    }

    #[test]
    fn triangle_interpolates_vertex_normals_when_present() {
        let tri = Primitive::Triangle {
            v0: Vertex {
                position: Vec3::new(-1.0, -1.0, -5.0),
                normal: Some(Vec3::new(0.0, 0.0, 1.0)),
                uv: None,
            },
            v1: Vertex {
                position: Vec3::new(1.0, -1.0, -5.0),
                normal: Some(Vec3::new(0.0, 0.0, 1.0)),
                uv: None,
            },
            v2: Vertex {
                position: Vec3::new(0.0, 1.0, -5.0),
                normal: Some(Vec3::new(0.0, 0.0, 1.0)),
                uv: None,
            },
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -0.1, -5.0));
        let rec = tri.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((rec.normal.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn quad_hit_at_center() {
        let quad = Primitive::Quad {
            q: Vec3::new(-1.0, -1.0, -5.0),
            u: Vec3::new(2.0, 0.0, 0.0),
            v: Vec3::new(0.0, 2.0, 0.0),
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = quad.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((rec.uv.x - 0.5).abs() < 1e-4);
        assert!((rec.uv.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn quad_miss_outside_parallelogram() {
        let quad = Primitive::Quad {
            q: Vec3::new(-1.0, -1.0, -5.0),
            u: Vec3::new(2.0, 0.0, 0.0),
            v: Vec3::new(0.0, 2.0, 0.0),
            mat_index: 0,
        };
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(quad.hit(&ray, 0.001, f32::INFINITY).is_none());
    }
}
