//! Cameras
//!
//! Camera space is right-handed with +x right, +y down and +z forward.
//! Use [`camera_look_transform`] to build a camera node's transform from a
//! position, a target and an up direction.

use glam::{Affine3A, Mat4, Vec3, Vec4};

use crate::scene::plane;
use crate::settings::DepthRange;

/// Offset pulling the infinite far plane just inside the depth range.
pub const FRUSTUM_EPSILON: f32 = 1.0 / 524_288.0;

pub const FRUSTUM_PLANE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraType {
    Frustum,
    Ortho,
}

/// Camera payload of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraNode {
    Frustum(FrustumCamera),
    Ortho(OrthoCamera),
}

impl From<FrustumCamera> for CameraNode {
    fn from(camera: FrustumCamera) -> Self {
        Self::Frustum(camera)
    }
}

impl From<OrthoCamera> for CameraNode {
    fn from(camera: OrthoCamera) -> Self {
        Self::Ortho(camera)
    }
}

impl CameraNode {
    #[must_use]
    pub fn camera_type(&self) -> CameraType {
        match self {
            Self::Frustum(_) => CameraType::Frustum,
            Self::Ortho(_) => CameraType::Ortho,
        }
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self {
            Self::Frustum(camera) => camera.projection_matrix(),
            Self::Ortho(camera) => camera.projection_matrix(),
        }
    }

    #[must_use]
    pub fn as_frustum(&self) -> Option<&FrustumCamera> {
        match self {
            Self::Frustum(camera) => Some(camera),
            Self::Ortho(_) => None,
        }
    }

    #[must_use]
    pub fn as_frustum_mut(&mut self) -> Option<&mut FrustumCamera> {
        match self {
            Self::Frustum(camera) => Some(camera),
            Self::Ortho(_) => None,
        }
    }

    /// Refreshes cached world-space planes after the node's transform changed.
    pub fn update_planes(&mut self, inverse_world: &Affine3A) {
        if let Self::Frustum(camera) = self {
            camera.update_planes(inverse_world);
        }
    }
}

// ============================================================================
// Frustum camera
// ============================================================================

/// Perspective camera with an infinite far plane.
///
/// - `projection_distance` (g): distance to the projection plane, i.e.
///   `1 / tan(fov_y / 2)`
/// - `aspect_ratio` (s): width over height
/// - `near_depth` (n): distance to the near plane
///
/// World-space planes are cached and only valid after the owning node's
/// world transform has been propagated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumCamera {
    pub projection_distance: f32,
    pub aspect_ratio: f32,
    pub near_depth: f32,
    pub depth_range: DepthRange,
    world_planes: [Vec4; FRUSTUM_PLANE_COUNT],
}

impl FrustumCamera {
    #[must_use]
    pub fn new(projection_distance: f32, aspect_ratio: f32, near_depth: f32) -> Self {
        let mut camera = Self {
            projection_distance,
            aspect_ratio,
            near_depth,
            depth_range: DepthRange::default(),
            world_planes: [Vec4::ZERO; FRUSTUM_PLANE_COUNT],
        };
        camera.world_planes = camera.camera_space_planes();
        camera
    }

    /// Builds a camera from a vertical field of view in radians.
    #[must_use]
    pub fn from_fov(fov_y: f32, aspect_ratio: f32, near_depth: f32) -> Self {
        Self::new(1.0 / (fov_y * 0.5).tan(), aspect_ratio, near_depth)
    }

    #[must_use]
    pub fn with_depth_range(mut self, depth_range: DepthRange) -> Self {
        self.depth_range = depth_range;
        self
    }

    /// Infinite projection for +z-forward, +y-down camera space.
    ///
    /// | row | contents |
    /// |-----|----------|
    /// | 0 | `g/s, 0, 0, 0` |
    /// | 1 | `0, -g, 0, 0` |
    /// | 2 | `0, 0, 1-ε, -n(1-ε)` for `[0, 1]`, `0, 0, 1-ε, -n(2-ε)` for `[-1, 1]` |
    /// | 3 | `0, 0, 1, 0` |
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        let g = self.projection_distance;
        let s = self.aspect_ratio;
        let n = self.near_depth;
        let k = 1.0 - FRUSTUM_EPSILON;
        let depth_offset = match self.depth_range {
            DepthRange::ZeroToOne => -n * k,
            DepthRange::NegativeOneToOne => -n * (2.0 - FRUSTUM_EPSILON),
        };

        Mat4::from_cols(
            Vec4::new(g / s, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -g, 0.0, 0.0),
            Vec4::new(0.0, 0.0, k, 1.0),
            Vec4::new(0.0, 0.0, depth_offset, 0.0),
        )
    }

    /// Left, right, top, bottom and near planes in camera space, inward facing.
    #[must_use]
    pub fn camera_space_planes(&self) -> [Vec4; FRUSTUM_PLANE_COUNT] {
        let g = self.projection_distance;
        let s = self.aspect_ratio;
        let rx = 1.0 / (g * g + s * s).sqrt();
        let ry = 1.0 / (g * g + 1.0).sqrt();

        [
            Vec4::new(g * rx, 0.0, s * rx, 0.0),
            Vec4::new(-g * rx, 0.0, s * rx, 0.0),
            Vec4::new(0.0, g * ry, ry, 0.0),
            Vec4::new(0.0, -g * ry, ry, 0.0),
            Vec4::new(0.0, 0.0, 1.0, -self.near_depth),
        ]
    }

    /// Carries the camera-space planes into world space.
    pub fn update_planes(&mut self, inverse_world: &Affine3A) {
        let local = self.camera_space_planes();
        for (world, plane) in self.world_planes.iter_mut().zip(local) {
            *world = plane::to_world(plane, inverse_world);
        }
    }

    /// World-space planes from the last transform update.
    #[must_use]
    pub fn world_planes(&self) -> &[Vec4; FRUSTUM_PLANE_COUNT] {
        &self.world_planes
    }

    /// Conservative sphere test: `false` only when the sphere lies entirely
    /// outside one plane.
    #[must_use]
    pub fn sphere_visible(&self, center: Vec3, radius: f32) -> bool {
        self.world_planes
            .iter()
            .all(|p| plane::distance(*p, center) >= -radius)
    }

    /// Conservative test for a box spanning `0..size` in the space of `transform`.
    #[must_use]
    pub fn box_visible(&self, transform: &Affine3A, size: Vec3) -> bool {
        let (center, half_axes) = plane::box_center_and_half_axes(transform, size);
        self.world_planes.iter().all(|p| {
            let rg = plane::effective_radius(*p, &half_axes);
            plane::distance(*p, center) > -rg
        })
    }
}

// ============================================================================
// Ortho camera
// ============================================================================

/// Orthographic camera mapping `x ∈ [0, width]`, `y ∈ [0, height]` (y down)
/// to clip space. Used for overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    pub width: f32,
    pub height: f32,
}

impl OrthoCamera {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            Vec4::new(2.0 / self.width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -2.0 / self.height, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(-1.0, 1.0, 0.0, 1.0),
        )
    }
}

/// Camera node transform at `position` looking at `target`.
///
/// The columns are right, down and forward, matching camera space.
#[must_use]
pub fn camera_look_transform(position: Vec3, target: Vec3, up: Vec3) -> Affine3A {
    let forward = (target - position).normalize();
    let right = forward.cross(up).normalize();
    let down = forward.cross(right);
    Affine3A::from_cols(right.into(), down.into(), forward.into(), position.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_plane_maps_to_depth_range_start() {
        let camera = FrustumCamera::new(1.0, 1.0, 0.5);
        let clip = camera.projection_matrix() * Vec4::new(0.0, 0.0, 0.5, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-6);

        let gl = camera.with_depth_range(DepthRange::NegativeOneToOne);
        let clip = gl.projection_matrix() * Vec4::new(0.0, 0.0, 0.5, 1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-5);

        let far = camera.projection_matrix() * Vec4::new(0.0, 0.0, 1.0e6, 1.0);
        assert!(far.z / far.w < 1.0);
    }

    #[test]
    fn look_transform_axes() {
        let t = camera_look_transform(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        assert!(Vec3::from(t.matrix3.z_axis).abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(Vec3::from(t.matrix3.x_axis).abs_diff_eq(Vec3::X, 1e-6));
        assert!(Vec3::from(t.matrix3.y_axis).abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn ortho_maps_corners() {
        let camera = OrthoCamera::new(800.0, 600.0);
        let m = camera.projection_matrix();
        assert!((m * Vec4::new(0.0, 0.0, 0.0, 1.0)).abs_diff_eq(Vec4::new(-1.0, 1.0, 0.0, 1.0), 1e-6));
        assert!((m * Vec4::new(800.0, 600.0, 0.0, 1.0)).abs_diff_eq(Vec4::new(1.0, -1.0, 0.0, 1.0), 1e-6));
    }
}
