// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPSILON, SHADOW_EPSILON};
pub use transform::Transform;
