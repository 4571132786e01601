use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Per-frame parameter block shared by every program.
///
/// The world manager fills the camera, ambient and fog fields once per frame
/// and rewrites the light fields before each additive light pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct UniversalParams {
    /// Camera world position, `w = 1`.
    pub camera_position: Vec4,
    /// Camera world-space right axis (world column 0), `w = 0`.
    pub camera_right: Vec4,
    /// Camera world-space down axis (world column 1), `w = 0`.
    pub camera_down: Vec4,
    pub ambient_color: Vec4,
    pub light_color: Vec4,
    /// Light world position, `w = 1`.
    pub light_position: Vec4,
    /// See [`LightNode::attenuation_constants`](crate::scene::LightNode::attenuation_constants).
    pub atten_const: Vec4,
    pub fog_plane: Vec4,
    pub fog_color: Vec4,
    /// See [`FogNode::fog_params`](crate::scene::fog::FogNode::fog_params).
    pub fog_params: Vec4,
}

impl UniversalParams {
    /// Raw bytes for upload into a uniform buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
