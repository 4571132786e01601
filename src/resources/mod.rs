pub mod primitives;

pub use primitives::{create_box, create_sphere};
