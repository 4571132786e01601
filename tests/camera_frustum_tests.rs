//! Camera and Frustum Tests
//!
//! Tests for:
//! - Infinite projection matrix layout and depth conventions
//! - Camera-space and world-space frustum planes
//! - Frustum-sphere and frustum-box rejection
//! - Orthographic overlay projection
//! - Point light visibility

use glam::{Affine3A, Quat, Vec3, Vec4};

use umbra::scene::camera::camera_look_transform;
use umbra::scene::plane;
use umbra::{DepthRange, FrustumCamera, LightNode, OrthoCamera, Transformable};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Camera at `position` looking down world -z with +y up.
fn camera_looking_down_neg_z(position: Vec3) -> FrustumCamera {
    let mut camera = FrustumCamera::new(1.0, 1.0, 0.1);
    let world = Transformable::new(camera_look_transform(position, position - Vec3::Z, Vec3::Y));
    camera.update_planes(world.inverse_world_transform());
    camera
}

// ============================================================================
// Projection Matrix Tests
// ============================================================================

#[test]
fn projection_matrix_layout() {
    let camera = FrustumCamera::new(2.0, 1.5, 0.25);
    let m = camera.projection_matrix();
    let eps = 1.0 / 524_288.0;

    assert!(approx(m.row(0).x, 2.0 / 1.5));
    assert!(approx(m.row(1).y, -2.0));
    assert!(approx(m.row(2).z, 1.0 - eps));
    assert!(approx(m.row(2).w, -0.25 * (1.0 - eps)));
    assert_eq!(m.row(3), Vec4::new(0.0, 0.0, 1.0, 0.0));
}

#[test]
fn depth_increases_toward_infinity() {
    for range in [DepthRange::ZeroToOne, DepthRange::NegativeOneToOne] {
        let camera = FrustumCamera::new(1.0, 1.0, 0.1).with_depth_range(range);
        let depth = |z: f32| {
            let clip = camera.projection_matrix() * Vec4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert!(depth(1.0) < depth(10.0));
        assert!(depth(10.0) < depth(1000.0));
        assert!(depth(1.0e7) < 1.0);
    }
}

#[test]
fn near_plane_depth_per_convention() {
    let camera = FrustumCamera::new(1.0, 1.0, 0.1);
    let clip = camera.projection_matrix() * Vec4::new(0.0, 0.0, 0.1, 1.0);
    assert!(approx(clip.z / clip.w, 0.0));

    let camera = camera.with_depth_range(DepthRange::NegativeOneToOne);
    let clip = camera.projection_matrix() * Vec4::new(0.0, 0.0, 0.1, 1.0);
    assert!(approx(clip.z / clip.w, -1.0));
}

#[test]
fn camera_down_maps_to_clip_down() {
    let camera = FrustumCamera::new(1.0, 1.0, 0.1);
    // +y in camera space is down, clip +y is up
    let clip = camera.projection_matrix() * Vec4::new(0.0, 1.0, 5.0, 1.0);
    assert!(clip.y < 0.0);
}

// ============================================================================
// Frustum Plane Tests
// ============================================================================

#[test]
fn camera_space_planes_are_unit_and_inward() {
    let camera = FrustumCamera::new(1.7, 1.3, 0.5);
    for p in camera.camera_space_planes() {
        assert!(approx(p.truncate().length(), 1.0));
        // A point straight ahead is inside every plane
        assert!(plane::distance(p, Vec3::new(0.0, 0.0, 10.0)) > 0.0);
    }
}

#[test]
fn world_planes_follow_camera_transform() {
    let camera = camera_looking_down_neg_z(Vec3::new(0.0, 0.0, 10.0));
    let near = camera.world_planes()[4];
    // Near plane at z = 10 - 0.1, facing -z
    assert!(near.truncate().abs_diff_eq(Vec3::NEG_Z, EPSILON));
    assert!(approx(plane::distance(near, Vec3::new(0.0, 0.0, 9.9)), 0.0));
}

// ============================================================================
// Frustum-Sphere Tests
// ============================================================================

#[test]
fn sphere_ahead_is_visible() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    assert!(camera.sphere_visible(Vec3::new(0.0, 0.0, -5.0), 0.1));
}

#[test]
fn sphere_far_outside_is_rejected() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    assert!(!camera.sphere_visible(Vec3::new(1000.0, 1000.0, 1000.0), 1.0));
}

#[test]
fn sphere_behind_camera_is_rejected() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    assert!(!camera.sphere_visible(Vec3::new(0.0, 0.0, 5.0), 1.0));
}

#[test]
fn sphere_straddling_plane_is_visible() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    // 90° fov: the right plane passes through x = -z
    assert!(camera.sphere_visible(Vec3::new(5.5, 0.0, -5.0), 1.0));
    assert!(!camera.sphere_visible(Vec3::new(8.0, 0.0, -5.0), 1.0));
}

#[test]
fn sphere_straddling_near_plane_is_visible() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    assert!(camera.sphere_visible(Vec3::new(0.0, 0.0, 0.3), 0.5));
}

// ============================================================================
// Frustum-Box Tests
// ============================================================================

#[test]
fn box_ahead_is_visible() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let transform = Affine3A::from_translation(Vec3::new(-0.5, -0.5, -5.5));
    assert!(camera.box_visible(&transform, Vec3::ONE));
}

#[test]
fn box_behind_is_rejected() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let transform = Affine3A::from_translation(Vec3::new(-0.5, -0.5, 4.0));
    assert!(!camera.box_visible(&transform, Vec3::ONE));
}

#[test]
fn box_origin_is_its_minimum_corner() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    // Origin outside the left plane, but the box reaches back inside
    let transform = Affine3A::from_translation(Vec3::new(-7.0, 0.0, -5.0));
    assert!(camera.box_visible(&transform, Vec3::new(3.0, 1.0, 1.0)));
    assert!(!camera.box_visible(&transform, Vec3::new(1.0, 1.0, 1.0)));
}

#[test]
fn rotated_box_uses_projected_extent() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let transform = Affine3A::from_rotation_translation(Quat::from_rotation_z(0.7), Vec3::new(0.0, 0.0, -20.0));
    assert!(camera.box_visible(&transform, Vec3::splat(2.0)));
}

#[test]
fn box_centered_on_a_plane_is_visible_in_any_orientation() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let size = Vec3::new(0.5, 1.0, 0.25);
    let ahead = Vec3::new(0.0, 0.0, -5.0);
    let rotations = [
        Quat::IDENTITY,
        Quat::from_rotation_y(0.9),
        Quat::from_rotation_x(-2.3),
        Quat::from_euler(glam::EulerRot::XYZ, 0.4, 1.1, -0.6),
        Quat::from_axis_angle(Vec3::new(1.0, 1.0, 1.0).normalize(), 3.0),
    ];

    for p in camera.world_planes() {
        let center = ahead - p.truncate() * plane::distance(*p, ahead);
        assert!(approx(plane::distance(*p, center), 0.0));
        for rotation in rotations {
            let transform = Affine3A::from_rotation_translation(rotation, center - rotation * (size * 0.5));
            assert!(camera.box_visible(&transform, size), "plane {p:?}, rotation {rotation:?}");
        }
    }
}

// ============================================================================
// Ortho Camera Tests
// ============================================================================

#[test]
fn ortho_projection_layout() {
    let m = OrthoCamera::new(200.0, 100.0).projection_matrix();
    assert!(approx(m.row(0).x, 0.01));
    assert!(approx(m.row(0).w, -1.0));
    assert!(approx(m.row(1).y, -0.02));
    assert!(approx(m.row(1).w, 1.0));
    assert!(approx(m.row(2).z, 1.0));
    assert!(approx(m.row(3).w, 1.0));
}

// ============================================================================
// Light Visibility Tests
// ============================================================================

#[test]
fn infinite_light_is_always_visible() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let light = LightNode::infinite(Vec4::ONE);
    assert!(light.light_visible(Vec3::new(0.0, 0.0, 1000.0), &camera));
}

#[test]
fn point_light_uses_range_sphere() {
    let camera = camera_looking_down_neg_z(Vec3::ZERO);
    let light = LightNode::point(Vec4::ONE, 2.0);
    assert!(light.light_visible(Vec3::new(0.0, 0.0, -5.0), &camera));
    // Behind the camera but its range reaches past the near plane
    assert!(light.light_visible(Vec3::new(0.0, 0.0, 1.0), &camera));
    assert!(!light.light_visible(Vec3::new(0.0, 0.0, 50.0), &camera));
}
