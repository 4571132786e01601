//! Geometry Tests
//!
//! Tests for:
//! - Shape-driven visibility, occlusion and illumination predicates
//! - Transform parameter packing before a draw
//! - Release of buffers and shared programs and textures
//! - Text geometry render state and reshaping

use std::sync::Arc;

use glam::{Affine3A, Mat4, Vec2, Vec3, Vec4};

use umbra::render::{
    BlendMode, GraphicsDevice, Program, RenderFlags, Texture, TextureDescriptor, TextureFormat,
};
use umbra::scene::camera::camera_look_transform;
use umbra::scene::geometry::{GeometryType, TRANSFORM_PARAM_COUNT, VIEWPORT_PARAM_SLOT};
use umbra::text::{GlyphVertex, TextLayout};
use umbra::{
    Font, FrustumCamera, GeometryNode, LightNode, OccluderNode, RecordingDevice, TextShaper,
    Transformable, Triangle, UmbraError, Vertex,
};

const EPSILON: f32 = 1e-4;

fn device() -> RecordingDevice {
    RecordingDevice::new(Vec2::new(800.0, 600.0))
}

fn camera_at_origin() -> FrustumCamera {
    let mut camera = FrustumCamera::new(1.0, 1.0, 0.1);
    let world = Transformable::new(camera_look_transform(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y));
    camera.update_planes(world.inverse_world_transform());
    camera
}

fn at(position: Vec3) -> Transformable {
    Transformable::new(Affine3A::from_translation(position))
}

/// Four vertices and two triangles per non-space character.
struct QuadShaper;

impl TextShaper for QuadShaper {
    fn count_glyph_geometry(&self, _font: &Font, text: &str) -> (usize, usize) {
        let glyphs = text.chars().count();
        (glyphs * 4, glyphs * 2)
    }

    fn build_glyph_geometry(
        &self,
        _font: &Font,
        layout: &TextLayout,
        text: &str,
        vertices: &mut [GlyphVertex],
        triangles: &mut [Triangle],
    ) -> umbra::Result<(usize, usize)> {
        let mut glyphs = 0;
        for (i, c) in text.chars().enumerate() {
            if c == ' ' {
                continue;
            }
            let x = i as f32 * layout.font_size;
            for (corner, (dx, dy)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].into_iter().enumerate() {
                vertices[glyphs * 4 + corner] = GlyphVertex {
                    attributes: [[x + dx * layout.font_size, dy * layout.font_size, dx, dy], [0.0; 4], [0.0; 4], [0.0; 4]],
                    color: layout.color,
                };
            }
            let base = (glyphs * 4) as u16;
            triangles[glyphs * 2] = Triangle::new(base, base + 1, base + 2);
            triangles[glyphs * 2 + 1] = Triangle::new(base, base + 2, base + 3);
            glyphs += 1;
        }
        Ok((glyphs * 4, glyphs * 2))
    }

    fn vertex_shader_source(&self) -> &str {
        "// glyph vertex functions\n"
    }

    fn fragment_shader_source(&self) -> &str {
        "// glyph fragment functions\n"
    }
}

struct FailingShaper;

impl TextShaper for FailingShaper {
    fn count_glyph_geometry(&self, _font: &Font, _text: &str) -> (usize, usize) {
        (0, 0)
    }

    fn build_glyph_geometry(
        &self,
        _font: &Font,
        _layout: &TextLayout,
        _text: &str,
        _vertices: &mut [GlyphVertex],
        _triangles: &mut [Triangle],
    ) -> umbra::Result<(usize, usize)> {
        Err(UmbraError::TextShaping("no such font".to_string()))
    }

    fn vertex_shader_source(&self) -> &str {
        ""
    }

    fn fragment_shader_source(&self) -> &str {
        ""
    }
}

fn font(device: &mut RecordingDevice) -> Font {
    let curve = Texture::create(device, TextureDescriptor::d2(TextureFormat::Float16Rgba, 64, 64), &[]).unwrap();
    let band = Texture::create(device, TextureDescriptor::d2(TextureFormat::Uint16Rgba, 64, 64), &[]).unwrap();
    Font::new("test", curve, band)
}

fn layout() -> TextLayout {
    TextLayout {
        font_size: 10.0,
        color: [255, 255, 255, 255],
    }
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn sphere_visibility_uses_node_origin_and_radius() {
    let mut device = device();
    let sphere = GeometryNode::sphere(&mut device, 1.0).unwrap();
    let camera = camera_at_origin();

    assert_eq!(sphere.geometry_type(), GeometryType::Sphere);
    assert!(sphere.visible(&at(Vec3::new(0.0, 0.0, -5.0)), &camera));
    assert!(!sphere.visible(&at(Vec3::new(0.0, 0.0, 5.0)), &camera));
}

#[test]
fn box_visibility_uses_corner_origin() {
    let mut device = device();
    let cuboid = GeometryNode::cuboid(&mut device, Vec3::new(3.0, 1.0, 1.0)).unwrap();
    let camera = camera_at_origin();

    assert_eq!(cuboid.geometry_type(), GeometryType::Box);
    assert!(cuboid.visible(&at(Vec3::new(-7.0, 0.0, -5.0)), &camera));
    assert!(!cuboid.visible(&at(Vec3::new(-9.0, 0.0, -5.0)), &camera));
}

#[test]
fn mesh_is_always_visible_and_never_occluded() {
    let mut device = device();
    let mesh = GeometryNode::mesh(
        &mut device,
        vec![Vertex::default(); 3],
        vec![Triangle::new(0, 1, 2)],
    )
    .unwrap();
    let camera = camera_at_origin();
    let far_behind = at(Vec3::new(0.0, 0.0, 1000.0));

    let mut occluder = OccluderNode::new(Vec3::splat(100.0));
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(0.0, 0.0, 500.0));

    assert!(mesh.visible(&far_behind, &camera));
    assert!(!mesh.occluded(&at(Vec3::new(0.0, 0.0, -200.0)), &occluder));
    assert!(mesh.illuminated(&far_behind, &LightNode::point(Vec4::ONE, 1.0), Vec3::ZERO));
}

#[test]
fn sphere_behind_occluder_is_occluded() {
    let mut device = device();
    let sphere = GeometryNode::sphere(&mut device, 0.5).unwrap();
    let mut occluder = OccluderNode::new(Vec3::new(2.0, 2.0, 0.1));
    occluder.calculate_occluder_planes(&Transformable::IDENTITY, Vec3::new(0.0, 0.0, 10.0));

    assert!(sphere.occluded(&at(Vec3::new(0.0, 0.0, -5.0)), &occluder));
    assert!(!sphere.occluded(&at(Vec3::new(5.0, 0.0, -5.0)), &occluder));
}

#[test]
fn point_light_illuminates_every_bounded_shape() {
    let mut device = device();
    let light = LightNode::point(Vec4::ONE, 1.0);
    let sphere = GeometryNode::sphere(&mut device, 1.0).unwrap();
    let cuboid = GeometryNode::cuboid(&mut device, Vec3::ONE).unwrap();
    let far = at(Vec3::splat(500.0));

    assert!(sphere.illuminated(&far, &light, Vec3::ZERO));
    assert!(cuboid.illuminated(&far, &light, Vec3::ZERO));
}

// ============================================================================
// Draw Preparation
// ============================================================================

#[test]
fn prepare_to_render_packs_mvp_and_world_rows() {
    let mut device = device();
    let mut cuboid = GeometryNode::cuboid(&mut device, Vec3::ONE).unwrap();
    let world = at(Vec3::new(1.0, 2.0, 3.0));
    let view_projection = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));

    cuboid.prepare_to_render(&world, &view_projection, device.viewport_size());

    let mvp = view_projection * world.world_matrix();
    let params = &cuboid.renderable.vertex_params;
    assert_eq!(cuboid.renderable.vertex_param_count, TRANSFORM_PARAM_COUNT);
    for row in 0..4 {
        assert!(params[row].abs_diff_eq(mvp.row(row), EPSILON));
    }
    assert!(params[4].abs_diff_eq(Vec4::new(1.0, 0.0, 0.0, 1.0), EPSILON));
    assert!(params[5].abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 2.0), EPSILON));
    assert!(params[6].abs_diff_eq(Vec4::new(0.0, 0.0, 1.0, 3.0), EPSILON));
}

#[test]
fn release_returns_buffers() {
    let mut device = device();
    let mut sphere = GeometryNode::sphere(&mut device, 1.0).unwrap();
    assert_eq!(device.live_buffer_count(), 2);
    assert_eq!(device.live_vertex_array_count(), 1);

    sphere.release(&mut device);
    assert_eq!(device.live_buffer_count(), 0);
    assert_eq!(device.live_vertex_array_count(), 0);
    assert_eq!(sphere.renderable.index_count(), 0);
}

#[test]
fn shared_program_is_destroyed_after_last_owner() {
    let mut device = device();
    let program = Program::compile(&mut device, &["vs"], &["fs"]).unwrap();
    let handle = program.handle();
    let mut first = GeometryNode::sphere(&mut device, 1.0).unwrap();
    let mut second = GeometryNode::sphere(&mut device, 1.0).unwrap();
    first.renderable.set_program(0, Some(Arc::clone(&program)));
    second.renderable.set_program(0, Some(program));

    // Replacing one reference leaves the other owner in charge
    first.renderable.set_program(0, None);
    device.collect_released();
    assert_eq!(device.program_source(handle), Some(("vs", "fs")));

    second.release(&mut device);
    drop(second);
    assert!(device.program_source(handle).is_some());
    device.collect_released();
    assert!(device.program_source(handle).is_none());
    assert_eq!(device.live_program_count(), 0);
}

#[test]
fn font_textures_are_destroyed_with_the_font() {
    let mut device = device();
    let font = font(&mut device);
    let curve = font.curve_texture().handle();
    assert_eq!(device.live_texture_count(), 2);

    drop(font);
    device.collect_released();
    assert!(device.texture_data(curve).is_none());
    assert_eq!(device.live_texture_count(), 0);
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn text_geometry_has_overlay_render_state() {
    let mut device = device();
    let font = font(&mut device);
    let text = GeometryNode::text(&mut device, &QuadShaper, font.clone(), layout(), "Hi").unwrap();

    assert_eq!(text.geometry_type(), GeometryType::Text);
    let renderable = &text.renderable;
    assert_eq!(renderable.blend_mode, BlendMode::Alpha);
    assert!(!renderable.flags.contains(RenderFlags::DEPTH_WRITE));
    assert!(!renderable.flags.contains(RenderFlags::CULL_FACE));
    assert_eq!(renderable.texture_count(), 2);
    assert!(Arc::ptr_eq(renderable.texture(0).unwrap(), font.curve_texture()));
    assert!(Arc::ptr_eq(renderable.texture(1).unwrap(), font.band_texture()));
    assert!(renderable.program(0).is_some());
    assert!(renderable.program(1).is_none());

    assert_eq!(renderable.vertex_count(), 8);
    assert_eq!(renderable.index_count(), 12);
}

#[test]
fn text_program_wraps_shaper_sources() {
    let mut device = device();
    let font = font(&mut device);
    let text = GeometryNode::text(&mut device, &QuadShaper, font, layout(), "A").unwrap();

    let handle = text.renderable.program(0).unwrap().handle();
    let (vertex, fragment) = device.program_source(handle).unwrap();
    assert!(vertex.starts_with("#version"));
    assert!(vertex.contains("// glyph vertex functions"));
    assert!(vertex.contains("GlyphDilate"));
    assert!(fragment.contains("// glyph fragment functions"));
    assert!(fragment.contains("GlyphCoverage"));
}

#[test]
fn text_writes_viewport_after_transform_rows() {
    let mut device = device();
    let font = font(&mut device);
    let mut text = GeometryNode::text(&mut device, &QuadShaper, font, layout(), "Hi").unwrap();

    text.prepare_to_render(&Transformable::IDENTITY, &Mat4::IDENTITY, device.viewport_size());
    assert_eq!(text.renderable.vertex_param_count, TRANSFORM_PARAM_COUNT + 1);
    assert_eq!(
        text.renderable.vertex_params[VIEWPORT_PARAM_SLOT],
        Vec4::new(800.0, 600.0, 0.0, 0.0)
    );
}

#[test]
fn set_text_reshapes_and_replaces_buffers() {
    let mut device = device();
    let font = font(&mut device);
    let mut text = GeometryNode::text(&mut device, &QuadShaper, font, layout(), "Hi").unwrap();

    text.set_text(&mut device, &QuadShaper, "a b c").unwrap();
    // Spaces produce no glyphs
    assert_eq!(text.renderable.vertex_count(), 12);
    assert_eq!(text.renderable.index_count(), 18);
    assert_eq!(device.live_buffer_count(), 2);

    let umbra::scene::GeometryShape::Text(shape) = &text.shape else {
        panic!("expected text shape");
    };
    assert_eq!(shape.text(), "a b c");
}

#[test]
fn empty_text_releases_buffers() {
    let mut device = device();
    let font = font(&mut device);
    let mut text = GeometryNode::text(&mut device, &QuadShaper, font, layout(), "Hi").unwrap();

    text.set_text(&mut device, &QuadShaper, "").unwrap();
    assert_eq!(text.renderable.index_count(), 0);
    assert_eq!(device.live_buffer_count(), 0);
}

#[test]
fn shaping_failure_is_reported() {
    let mut device = device();
    let font = font(&mut device);
    let result = GeometryNode::text(&mut device, &FailingShaper, font, layout(), "x");
    assert!(matches!(result, Err(UmbraError::TextShaping(_))));
}

#[test]
fn set_text_on_non_text_geometry_fails() {
    let mut device = device();
    let mut sphere = GeometryNode::sphere(&mut device, 1.0).unwrap();
    let result = sphere.set_text(&mut device, &QuadShaper, "nope");
    assert!(matches!(result, Err(UmbraError::NodeTypeMismatch { .. })));
}
