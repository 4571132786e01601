//! Occluder Tests
//!
//! Tests for:
//! - Shadow-plane construction from the camera position
//! - Strict sphere and box containment
//! - Occluders under a non-identity world transform

use glam::{Affine3A, Quat, Vec3};

use umbra::{OccluderNode, Transformable};

const EPSILON: f32 = 1e-4;

/// Thin wall in the z = 0 plane, seen from (0, 0, 10).
fn wall_seen_from_front() -> OccluderNode {
    let mut occluder = OccluderNode::new(Vec3::new(2.0, 2.0, 0.1));
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(0.0, 0.0, 10.0));
    occluder
}

// ============================================================================
// Plane Construction
// ============================================================================

#[test]
fn planes_are_normalized() {
    let mut occluder = OccluderNode::new(Vec3::new(1.0, 2.0, 3.0));
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(7.0, -9.0, 11.0));
    assert!(occluder.plane_count() > 0);
    for p in occluder.planes() {
        assert!((p.truncate().length() - 1.0).abs() < EPSILON);
    }
}

#[test]
fn edge_view_uses_two_faces() {
    let mut occluder = OccluderNode::new(Vec3::ONE);
    // In front of +x and +z, level with y
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(10.0, 0.0, 10.0));
    // 2 faces + 6 silhouette edges; the shared edge is not on the silhouette
    assert_eq!(occluder.plane_count(), 8);
}

#[test]
fn camera_on_surface_disables_occluder() {
    let mut occluder = OccluderNode::new(Vec3::ONE);
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(occluder.plane_count(), 0);
}

#[test]
fn planes_are_rebuilt_each_call() {
    let mut occluder = OccluderNode::new(Vec3::ONE);
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::splat(10.0));
    assert_eq!(occluder.plane_count(), 9);
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::ZERO);
    assert_eq!(occluder.plane_count(), 0);
}

// ============================================================================
// Sphere Occlusion
// ============================================================================

#[test]
fn sphere_directly_behind_is_occluded() {
    let occluder = wall_seen_from_front();
    assert!(occluder.sphere_occluded(Vec3::new(0.0, 0.0, -5.0), 0.5));
}

#[test]
fn sphere_beside_the_shadow_is_not_occluded() {
    let occluder = wall_seen_from_front();
    assert!(!occluder.sphere_occluded(Vec3::new(5.0, 0.0, -5.0), 0.5));
}

#[test]
fn sphere_touching_the_wall_is_not_occluded() {
    let occluder = wall_seen_from_front();
    // Reaches through the back face plane at z = -0.1
    assert!(!occluder.sphere_occluded(Vec3::new(0.0, 0.0, -0.3), 0.5));
}

#[test]
fn sphere_in_front_is_not_occluded() {
    let occluder = wall_seen_from_front();
    assert!(!occluder.sphere_occluded(Vec3::new(0.0, 0.0, 5.0), 0.5));
}

// ============================================================================
// Box Occlusion
// ============================================================================

#[test]
fn box_behind_is_occluded() {
    let occluder = wall_seen_from_front();
    let transform = Affine3A::from_translation(Vec3::new(-0.5, -0.5, -5.5));
    assert!(occluder.box_occluded(&transform, Vec3::ONE));
}

#[test]
fn box_poking_out_of_the_shadow_is_not_occluded() {
    let occluder = wall_seen_from_front();
    // Spans x in 0..6, far wider than the shadow at z = -5
    let transform = Affine3A::from_translation(Vec3::new(0.0, -0.5, -5.5));
    assert!(!occluder.box_occluded(&transform, Vec3::new(6.0, 1.0, 1.0)));
}

// ============================================================================
// Transformed Occluders
// ============================================================================

#[test]
fn translated_occluder_casts_shadow_from_its_position() {
    let mut occluder = OccluderNode::new(Vec3::new(2.0, 2.0, 0.1));
    let world = Transformable::new(Affine3A::from_translation(Vec3::new(20.0, 0.0, 0.0)));
    occluder.calculate_occluder_planes(&world, Vec3::new(20.0, 0.0, 10.0));

    assert_eq!(occluder.plane_count(), 5);
    assert!(occluder.sphere_occluded(Vec3::new(20.0, 0.0, -5.0), 0.5));
    assert!(!occluder.sphere_occluded(Vec3::new(0.0, 0.0, -5.0), 0.5));
}

#[test]
fn rotated_occluder_faces_the_camera() {
    let mut occluder = OccluderNode::new(Vec3::new(2.0, 2.0, 0.1));
    // Wall turned to lie in the x = 0 plane
    let world = Transformable::new(Affine3A::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)));
    occluder.calculate_occluder_planes(&world, Vec3::new(10.0, 0.0, 0.0));

    assert_eq!(occluder.plane_count(), 5);
    assert!(occluder.sphere_occluded(Vec3::new(-5.0, 0.0, 0.0), 0.5));
    assert!(!occluder.sphere_occluded(Vec3::new(-5.0, 0.0, 5.0), 0.5));
}
