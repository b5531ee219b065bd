use crate::ray::Ray;
use crate::vec3::Vec3;

/// Minimum thickness on any axis; axes thinner than this are padded
/// symmetrically so the slab test never divides against a zero-width slab.
pub const AABB_DELTA: f32 = 1e-4;

/// An axis-aligned bounding box. `max >= min` on every axis is an invariant
/// maintained by the constructors below, not by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
    pub zmin: f32,
    pub zmax: f32,
}

impl Aabb {
    /// Build the box spanning two corner points, padding any degenerate axis.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let (xmin, xmax) = min_max(a.x, b.x);
        let (ymin, ymax) = min_max(a.y, b.y);
        let (zmin, zmax) = min_max(a.z, b.z);
        Self::from_minmax_padded(xmin, xmax, ymin, ymax, zmin, zmax)
    }

    fn from_minmax_padded(
        xmin: f32,
        xmax: f32,
        ymin: f32,
        ymax: f32,
        zmin: f32,
        zmax: f32,
    ) -> Self {
        let pad = |lo: f32, hi: f32| -> (f32, f32) {
            if (hi - lo) < AABB_DELTA {
                (lo - AABB_DELTA / 2.0, hi + AABB_DELTA / 2.0)
            } else {
                (lo, hi)
            }
        };
        let (xmin, xmax) = pad(xmin, xmax);
        let (ymin, ymax) = pad(ymin, ymax);
        let (zmin, zmax) = pad(zmin, zmax);
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    /// The smallest box containing both `self` and `other`. Used when
    /// building BVH interior nodes and when unioning scene bounds.
    pub fn union(self, other: Self) -> Self {
        Self {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
            zmin: self.zmin.min(other.zmin),
            zmax: self.zmax.max(other.zmax),
        }
    }

    /// Axis with the largest extent: 0 = x, 1 = y, 2 = z.
    pub fn longest_axis(&self) -> usize {
        let dx = self.xmax - self.xmin;
        let dy = self.ymax - self.ymin;
        let dz = self.zmax - self.zmin;
        if dx > dy {
            if dx > dz {
                0
            } else {
                2
            }
        } else if dy > dz {
            1
        } else {
            2
        }
    }

    /// The minimum coordinate on `axis` (0/1/2), used to order primitives
    /// before a BVH split.
    pub fn min_on_axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.xmin,
            1 => self.ymin,
            _ => self.zmin,
        }
    }

    /// Slab-method intersection test, tightening `[tmin, tmax]` along the
    /// way. Returns `Some` with the (possibly narrowed) interval on hit.
    #[inline]
    pub fn hit(&self, ray: &Ray, mut tmin: f32, mut tmax: f32) -> bool {
        let bounds = [
            (self.xmin, self.xmax, ray.origin.x, ray.inv_dir.x),
            (self.ymin, self.ymax, ray.origin.y, ray.inv_dir.y),
            (self.zmin, self.zmax, ray.origin.z, ray.inv_dir.z),
        ];
        for (min, max, origin, inv_d) in bounds {
            let mut t0 = (min - origin) * inv_d;
            let mut t1 = (max - origin) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmax <= tmin {
                return false;
            }
        }
        true
    }
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_axis_is_padded() {
        let b = Aabb::from_corners(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        assert!(b.xmax > b.xmin);
        assert!(b.xmax - b.xmin >= AABB_DELTA - 1e-9);
    }

    #[test]
    fn union_contains_both() {
        let a = Aabb::from_corners(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::from_corners(Vec3::new(2.0, -1.0, 0.0), Vec3::new(3.0, 0.0, 0.5));
        let u = a.union(b);
        assert_eq!(u.xmin, 0.0);
        assert_eq!(u.xmax, 3.0);
        assert_eq!(u.ymin, -1.0);
        assert_eq!(u.ymax, 1.0);
    }

    #[test]
    fn ray_through_box_hits() {
        let b = Aabb::from_corners(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&ray, 0.001, f32::INFINITY));
    }

    #[test]
    fn ray_missing_box() {
        let b = Aabb::from_corners(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(5.0, 5.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&ray, 0.001, f32::INFINITY));
    }

    #[test]
    fn longest_axis_is_correct() {
        let b = Aabb::from_corners(Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(b.longest_axis(), 0);
    }
}
