//! Asset import helpers.
//!
//! - [`image`]: decoding image files into RGBA8 pixels
//! - [`normal_map`]: normal maps from height maps
//! - [`horizon_map`]: horizon maps and the horizon direction cube
//! - [`importer`]: the scene-description collaborator used by
//!   [`World::import_scene`](crate::World::import_scene)

pub mod horizon_map;
pub mod image;
pub mod importer;
pub mod normal_map;

pub use horizon_map::{construct_horizon_map, generate_horizon_cube};
pub use self::image::{Image, decode_image, load_image};
pub use importer::{ImportedKind, ImportedNode, ImportedScene, SceneImporter};
pub use normal_map::construct_normal_map;
