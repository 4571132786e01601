//! Scene Graph
//!
//! Spatial nodes live in a generational arena ([`slotmap::SlotMap`]) keyed by
//! [`NodeHandle`]. Each node stores its parent handle and an ordered list of
//! child handles; a removed node's handle goes stale instead of dangling.
//!
//! - [`Node`]: name, local transform, cached world transforms, hierarchy
//! - [`NodeKind`]: the closed set of node variants
//! - [`transform_system`]: world-transform propagation
//! - [`camera`], [`light`], [`fog`], [`occluder`], [`geometry`]: the variants

pub mod camera;
pub mod fog;
pub mod geometry;
pub mod light;
pub mod node;
pub mod occluder;
pub mod plane;
pub mod text;
pub mod transform;
pub mod transform_system;
pub mod tree;

pub use camera::{CameraNode, CameraType, FrustumCamera, OrthoCamera, camera_look_transform};
pub use fog::FogNode;
pub use geometry::{
    BoxGeometry, GeometryNode, GeometryShape, GeometryType, MeshGeometry, SphereGeometry,
};
pub use light::{LightKind, LightNode, LightType};
pub use node::{Node, NodeKind, NodeType};
pub use occluder::{MAX_OCCLUDER_PLANES, OccluderNode};
pub use text::TextGeometry;
pub use transform::Transformable;

use slotmap::new_key_type;

new_key_type! {
    /// Generational handle of a node in a [`World`](crate::World).
    pub struct NodeHandle;
}
