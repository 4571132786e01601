use glam::{Affine3A, Mat4, Vec3, Vec4};

/// Fog payload of a node. The fog volume is the half-space below the node's
/// local `z = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogNode {
    pub color: Vec4,
    pub density: f32,
}

impl FogNode {
    #[must_use]
    pub fn new(color: Vec4, density: f32) -> Self {
        Self { color, density }
    }

    /// World-space fog plane: row 2 of the inverse world transform.
    #[must_use]
    pub fn fog_plane(inverse_world: &Affine3A) -> Vec4 {
        Mat4::from(*inverse_world).row(2)
    }

    /// Camera-dependent terms of the half-space fog integral:
    ///
    /// - `x`: density
    /// - `y`: `F·C`, signed distance from the fog plane to the camera
    /// - `z`: `k`, 1 when the camera is inside the fog (`F·C <= 0`), else 0
    /// - `w`: `1 - 2k`, the sign that clamps the in-fog segment per pixel
    #[must_use]
    pub fn fog_params(&self, fog_plane: Vec4, camera_position: Vec3) -> Vec4 {
        let camera_distance = fog_plane.truncate().dot(camera_position) + fog_plane.w;
        let inside = if camera_distance <= 0.0 { 1.0 } else { 0.0 };
        Vec4::new(self.density, camera_distance, inside, 1.0 - 2.0 * inside)
    }
}
