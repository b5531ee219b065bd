pub mod aabb;
pub mod camera;
pub mod error;
pub mod hittable;
pub mod material;
pub mod primitive;
pub mod ray;
pub mod rng;
pub mod scene;
pub mod vec2;
pub mod vec3;

// Re-export primary types for convenience.
pub use aabb::Aabb;
pub use camera::{Camera, CameraDesc};
pub use error::CoreError;
pub use hittable::Bvh;
pub use material::{scatter, Colour, HitRecord, Material};
pub use primitive::{Primitive, Vertex};
pub use ray::Ray;
pub use rng::Rng;
pub use scene::{ray_colour, Scene, BACKGROUND, SHADOW_ACNE_EPSILON};
pub use vec2::Vec2;
pub use vec3::Vec3;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
