//! Geometry Nodes
//!
//! A geometry node pairs a [`Renderable`] with a shape variant. The shape
//! decides which bounding test feeds the visibility, occlusion and
//! illumination predicates:
//!
//! | Shape  | Visible        | Occluded       | Illuminated      |
//! |--------|----------------|----------------|------------------|
//! | Sphere | sphere vs frustum | sphere vs occluder | sphere vs light |
//! | Box    | box vs frustum | box vs occluder | box vs light    |
//! | Mesh   | always         | never          | always           |
//! | Text   | always         | never          | always           |

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::errors::{Result, UmbraError};
use crate::render::device::GraphicsDevice;
use crate::render::renderable::Renderable;
use crate::render::vertex::{Triangle, Vertex};
use crate::resources::primitives::{create_box, create_sphere};
use crate::scene::camera::FrustumCamera;
use crate::scene::light::LightNode;
use crate::scene::occluder::OccluderNode;
use crate::scene::text::TextGeometry;
use crate::scene::transform::Transformable;
use crate::text::{Font, TextLayout, TextShaper};

/// Vertex parameter slots written by [`GeometryNode::prepare_to_render`]:
/// four MVP rows then three world rows.
pub const TRANSFORM_PARAM_COUNT: usize = 7;
/// Slot holding the viewport size for text geometry.
pub const VIEWPORT_PARAM_SLOT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Mesh,
    Sphere,
    Box,
    Text,
}

/// Arbitrary triangle mesh. The bind-pose vertices are kept for skinning.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
}

impl MeshGeometry {
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
}

/// Box spanning `0..size` in node space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub size: Vec3,
}

#[derive(Debug, Clone)]
pub enum GeometryShape {
    Mesh(MeshGeometry),
    Sphere(SphereGeometry),
    Box(BoxGeometry),
    Text(TextGeometry),
}

#[derive(Debug)]
pub struct GeometryNode {
    pub renderable: Renderable,
    pub shape: GeometryShape,
}

impl GeometryNode {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Uploads `vertices` and `triangles` once in the standard vertex format.
    pub fn mesh(
        device: &mut dyn GraphicsDevice,
        vertices: Vec<Vertex>,
        triangles: Vec<Triangle>,
    ) -> Result<Self> {
        let mut renderable = Renderable::new();
        renderable.upload_mesh(device, &vertices, &triangles)?;
        Ok(Self {
            renderable,
            shape: GeometryShape::Mesh(MeshGeometry {
                vertices,
                triangles,
            }),
        })
    }

    pub fn sphere(device: &mut dyn GraphicsDevice, radius: f32) -> Result<Self> {
        let (vertices, triangles) = create_sphere(radius);
        let mut renderable = Renderable::new();
        renderable.upload_mesh(device, &vertices, &triangles)?;
        Ok(Self {
            renderable,
            shape: GeometryShape::Sphere(SphereGeometry { radius }),
        })
    }

    pub fn cuboid(device: &mut dyn GraphicsDevice, size: Vec3) -> Result<Self> {
        let (vertices, triangles) = create_box(size);
        let mut renderable = Renderable::new();
        renderable.upload_mesh(device, &vertices, &triangles)?;
        Ok(Self {
            renderable,
            shape: GeometryShape::Box(BoxGeometry { size }),
        })
    }

    /// Text geometry shaped by `shaper`. The program goes in slot 0, so text
    /// draws in the ambient and overlay passes only.
    pub fn text(
        device: &mut dyn GraphicsDevice,
        shaper: &dyn TextShaper,
        font: Font,
        layout: TextLayout,
        text: &str,
    ) -> Result<Self> {
        let mut geometry = TextGeometry::new(font, layout);
        let mut renderable = Renderable::new();
        geometry.configure(&mut renderable, device, shaper)?;
        geometry.set_text(&mut renderable, device, shaper, text)?;
        Ok(Self {
            renderable,
            shape: GeometryShape::Text(geometry),
        })
    }

    /// Replaces the string of a text geometry.
    pub fn set_text(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaper: &dyn TextShaper,
        text: &str,
    ) -> Result<()> {
        match &mut self.shape {
            GeometryShape::Text(geometry) => geometry.set_text(&mut self.renderable, device, shaper, text),
            other => Err(UmbraError::NodeTypeMismatch {
                expected: "text geometry",
                found: shape_name(other),
            }),
        }
    }

    #[must_use]
    pub fn geometry_type(&self) -> GeometryType {
        match self.shape {
            GeometryShape::Mesh(_) => GeometryType::Mesh,
            GeometryShape::Sphere(_) => GeometryType::Sphere,
            GeometryShape::Box(_) => GeometryType::Box,
            GeometryShape::Text(_) => GeometryType::Text,
        }
    }

    #[must_use]
    pub fn as_mesh(&self) -> Option<&MeshGeometry> {
        match &self.shape {
            GeometryShape::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    #[must_use]
    pub fn visible(&self, world: &Transformable, camera: &FrustumCamera) -> bool {
        match &self.shape {
            GeometryShape::Sphere(sphere) => camera.sphere_visible(world.world_position(), sphere.radius),
            GeometryShape::Box(cuboid) => camera.box_visible(world.world_transform(), cuboid.size),
            GeometryShape::Mesh(_) | GeometryShape::Text(_) => true,
        }
    }

    #[must_use]
    pub fn occluded(&self, world: &Transformable, occluder: &OccluderNode) -> bool {
        match &self.shape {
            GeometryShape::Sphere(sphere) => occluder.sphere_occluded(world.world_position(), sphere.radius),
            GeometryShape::Box(cuboid) => occluder.box_occluded(world.world_transform(), cuboid.size),
            GeometryShape::Mesh(_) | GeometryShape::Text(_) => false,
        }
    }

    #[must_use]
    pub fn illuminated(&self, world: &Transformable, light: &LightNode, light_position: Vec3) -> bool {
        match &self.shape {
            GeometryShape::Sphere(sphere) => {
                light.sphere_illuminated(light_position, world.world_position(), sphere.radius)
            }
            GeometryShape::Box(cuboid) => {
                light.box_illuminated(light_position, world.world_transform(), cuboid.size)
            }
            GeometryShape::Mesh(_) | GeometryShape::Text(_) => true,
        }
    }

    // ========================================================================
    // Draw preparation
    // ========================================================================

    /// Packs the rows of `view_projection × world` into vertex params 0..4
    /// and the first three world rows into 4..7. Text also stores the
    /// viewport size in slot 7.
    pub fn prepare_to_render(&mut self, world: &Transformable, view_projection: &Mat4, viewport: Vec2) {
        let world_matrix = world.world_matrix();
        let mvp = *view_projection * world_matrix;

        let params = &mut self.renderable.vertex_params;
        for row in 0..4 {
            params[row] = mvp.row(row);
        }
        for row in 0..3 {
            params[4 + row] = world_matrix.row(row);
        }

        self.renderable.vertex_param_count = if let GeometryShape::Text(_) = self.shape {
            params[VIEWPORT_PARAM_SLOT] = Vec4::new(viewport.x, viewport.y, 0.0, 0.0);
            TRANSFORM_PARAM_COUNT + 1
        } else {
            TRANSFORM_PARAM_COUNT
        };
    }

    /// Returns the renderable's exclusive GPU objects to the device.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.renderable.release(device);
    }
}

fn shape_name(shape: &GeometryShape) -> &'static str {
    match shape {
        GeometryShape::Mesh(_) => "mesh geometry",
        GeometryShape::Sphere(_) => "sphere geometry",
        GeometryShape::Box(_) => "box geometry",
        GeometryShape::Text(_) => "text geometry",
    }
}
