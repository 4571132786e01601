#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Umbra: scene graph and visibility/render orchestration core.
//!
//! A [`World`] owns a tree of spatial [`Node`]s. Once per frame it moves the
//! registered controllers, propagates world transforms from the root, culls
//! geometry against the active frustum camera (and any occluders), then
//! drives an ambient pass followed by one additive pass per visible point
//! light. All GPU work goes through the [`GraphicsDevice`] collaborator.

pub mod assets;
pub mod controller;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod text;
pub mod world;

pub use controller::{Controller, ControllerKey, LightController, SkinController};
pub use errors::{Result, UmbraError};
pub use render::{GraphicsDevice, RecordingDevice, Renderable, UniversalParams, Vertex, Triangle};
pub use scene::{
    CameraNode, FogNode, FrustumCamera, GeometryNode, LightNode, Node, NodeHandle, NodeKind,
    NodeType, OccluderNode, OrthoCamera, Transformable,
};
pub use settings::{DepthRange, WorldSettings};
pub use text::{Font, TextShaper};
pub use world::{RenderStats, World};
