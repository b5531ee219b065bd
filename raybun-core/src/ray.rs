use crate::vec3::Vec3;

/// A ray, with the inverse direction cached so slab tests in the BVH and
/// primitive intersections multiply instead of divide.
///
/// `direction` is not required to be unit length; intersection routines
/// account for `‖direction‖²` where needed.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_dir: direction.recip(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
