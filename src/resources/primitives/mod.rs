//! Procedural primitives in the standard vertex format.

pub mod box_shape;
pub mod sphere;

pub use box_shape::create_box;
pub use sphere::{SPHERE_X_DIVISIONS, SPHERE_Z_DIVISIONS, create_sphere};
