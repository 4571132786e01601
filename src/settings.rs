//! World Settings
//!
//! Host-facing configuration of the world manager.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use umbra::{World, WorldSettings, DepthRange};
//!
//! // Defaults: [0, 1] depth, occlusion culling on
//! let world = World::new(WorldSettings::default());
//!
//! // OpenGL-style clip depth, no occlusion test
//! let settings = WorldSettings {
//!     depth_range: DepthRange::NegativeOneToOne,
//!     occlusion_culling: false,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON document
//! let settings = WorldSettings::from_json_str(r#"{ "occlusion_culling": false }"#)?;
//! ```

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Clip-space depth convention produced by frustum projection matrices.
///
/// Both conventions use an infinite far plane; see
/// [`FrustumCamera::projection_matrix`](crate::scene::camera::FrustumCamera::projection_matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthRange {
    /// Depth 0 at the near plane, approaching 1 at infinity.
    #[default]
    ZeroToOne,
    /// Depth -1 at the near plane, approaching 1 at infinity.
    NegativeOneToOne,
}

/// Configuration of a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Depth convention for the active camera's projection. Applied when
    /// the world is preprocessed.
    pub depth_range: DepthRange,

    /// When enabled, geometry proven hidden behind an occluder is skipped in
    /// the ambient pass (and therefore in every light pass).
    pub occlusion_culling: bool,

    /// Angular speed, in radians per second, of light revolution controllers.
    pub light_revolution_rate: f32,

    /// Ambient color published in the per-frame parameter block.
    pub ambient_color: Vec4,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            depth_range: DepthRange::default(),
            occlusion_culling: true,
            light_revolution_rate: 0.2,
            ambient_color: Vec4::ZERO,
        }
    }
}

impl WorldSettings {
    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
