//! Plane helpers.
//!
//! A plane is a `Vec4` `(n, d)`; a point `p` is on the positive side when
//! `n · p + d > 0`.

use glam::{Affine3A, Mat4, Vec3, Vec4};

/// Signed distance (scaled by `|n|`) from `point` to `plane`.
#[inline]
#[must_use]
pub fn distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

/// Dot product of the plane normal with a direction.
#[inline]
#[must_use]
pub fn dot_direction(plane: Vec4, direction: Vec3) -> f32 {
    plane.truncate().dot(direction)
}

/// Carries a plane expressed in some object's space into world space.
///
/// `inverse_world` is the inverse of that object's world transform; the plane
/// is multiplied as a row vector, so the result is `inverse_worldᵀ · plane`.
#[inline]
#[must_use]
pub fn to_world(plane: Vec4, inverse_world: &Affine3A) -> Vec4 {
    Mat4::from(*inverse_world).transpose() * plane
}

/// Plane with unit normal `normal` through `point`.
#[inline]
#[must_use]
pub fn from_point_normal(normal: Vec3, point: Vec3) -> Vec4 {
    normal.extend(-normal.dot(point))
}

/// Box helper shared by culling tests: world center and scaled half-axes of
/// a box spanning `0..size` in the local space of `transform`.
#[must_use]
pub fn box_center_and_half_axes(transform: &Affine3A, size: Vec3) -> (Vec3, [Vec3; 3]) {
    let half = size * 0.5;
    let axes = [
        Vec3::from(transform.matrix3.x_axis) * half.x,
        Vec3::from(transform.matrix3.y_axis) * half.y,
        Vec3::from(transform.matrix3.z_axis) * half.z,
    ];
    let center = Vec3::from(transform.translation) + axes[0] + axes[1] + axes[2];
    (center, axes)
}

/// Projected radius of a box onto the plane normal.
#[inline]
#[must_use]
pub fn effective_radius(plane: Vec4, half_axes: &[Vec3; 3]) -> f32 {
    half_axes.iter().map(|a| dot_direction(plane, *a).abs()).sum()
}
