//! Box occluders.
//!
//! Each frame an occluder derives, from the active camera's position, the
//! planes bounding the region hidden behind it: the planes of the box faces
//! turned toward the camera, plus one plane through the camera and each
//! silhouette edge. A bound is occluded only when it lies strictly inside
//! every plane.

use glam::{Affine3A, Vec3, Vec4};
use smallvec::SmallVec;

use crate::scene::plane;
use crate::scene::transform::Transformable;

/// Three front faces plus six silhouette edges at most.
pub const MAX_OCCLUDER_PLANES: usize = 9;

/// Occluder payload of a node: a box centered on the node origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OccluderNode {
    pub half_extents: Vec3,
    planes: SmallVec<[Vec4; MAX_OCCLUDER_PLANES]>,
}

impl OccluderNode {
    #[must_use]
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            planes: SmallVec::new(),
        }
    }

    /// Number of planes computed for the current frame; zero disables the occluder.
    #[must_use]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// World-space planes for the current frame, unit normals facing into the shadow.
    #[must_use]
    pub fn planes(&self) -> &[Vec4] {
        &self.planes
    }

    /// Rebuilds the shadow planes for a camera at `camera_position`.
    ///
    /// `occluder` is the occluder node's own world transform. A camera inside
    /// or on the surface of the box yields zero planes.
    pub fn calculate_occluder_planes(&mut self, occluder: &Transformable, camera_position: Vec3) {
        self.planes.clear();

        let h = self.half_extents;
        let c = occluder.inverse_world_transform().transform_point3(camera_position);
        if c.x.abs() <= h.x && c.y.abs() <= h.y && c.z.abs() <= h.z {
            return;
        }

        // front[axis][0] is the -axis face, front[axis][1] the +axis face
        let mut front = [[false; 2]; 3];
        for axis in 0..3 {
            front[axis][0] = c[axis] < -h[axis];
            front[axis][1] = c[axis] > h[axis];
        }

        let mut local: SmallVec<[Vec4; MAX_OCCLUDER_PLANES]> = SmallVec::new();

        for axis in 0..3 {
            for (side, sign) in [(0, -1.0f32), (1, 1.0)] {
                if front[axis][side] {
                    // Inward-facing plane of the face: sign * x_axis <= h_axis
                    let mut normal = Vec3::ZERO;
                    normal[axis] = -sign;
                    local.push(normal.extend(h[axis]));
                }
            }
        }

        for (a, b) in [(0usize, 1usize), (1, 2), (2, 0)] {
            let k = 3 - a - b;
            for (side_a, sign_a) in [(0usize, -1.0f32), (1, 1.0)] {
                for (side_b, sign_b) in [(0usize, -1.0f32), (1, 1.0)] {
                    if front[a][side_a] == front[b][side_b] {
                        continue;
                    }
                    let mut point = Vec3::ZERO;
                    point[a] = sign_a * h[a];
                    point[b] = sign_b * h[b];
                    let mut direction = Vec3::ZERO;
                    direction[k] = 1.0;

                    let normal = direction.cross(point - c).normalize_or_zero();
                    if normal == Vec3::ZERO {
                        continue;
                    }
                    // Box center on the positive side
                    let normal = if normal.dot(-c) < 0.0 { -normal } else { normal };
                    local.push(plane::from_point_normal(normal, c));
                }
            }
        }

        let inverse = occluder.inverse_world_transform();
        for p in local {
            let world = plane::to_world(p, inverse);
            let length = world.truncate().length();
            if length > f32::EPSILON {
                self.planes.push(world / length);
            }
        }
    }

    /// `true` only when the sphere is strictly inside every shadow plane.
    #[must_use]
    pub fn sphere_occluded(&self, center: Vec3, radius: f32) -> bool {
        !self.planes.is_empty()
            && self
                .planes
                .iter()
                .all(|p| plane::distance(*p, center) > radius)
    }

    /// `true` only when the box spanning `0..size` in `transform` space is
    /// strictly inside every shadow plane.
    #[must_use]
    pub fn box_occluded(&self, transform: &Affine3A, size: Vec3) -> bool {
        if self.planes.is_empty() {
            return false;
        }
        let (center, half_axes) = plane::box_center_and_half_axes(transform, size);
        self.planes
            .iter()
            .all(|p| plane::distance(*p, center) > plane::effective_radius(*p, &half_axes))
    }
}
