use glam::{Affine3A, Quat, Vec3};

use crate::controller::ControllerKey;
use crate::scene::NodeHandle;
use crate::scene::camera::{CameraNode, FrustumCamera};
use crate::scene::fog::FogNode;
use crate::scene::geometry::GeometryNode;
use crate::scene::light::LightNode;
use crate::scene::occluder::OccluderNode;
use crate::scene::transform::Transformable;

/// Type tag of a node, available without matching on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Group,
    Camera,
    Light,
    Fog,
    Occluder,
    Bone,
    Geometry,
}

impl NodeType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Camera => "camera",
            Self::Light => "light",
            Self::Fog => "fog",
            Self::Occluder => "occluder",
            Self::Bone => "bone",
            Self::Geometry => "geometry",
        }
    }
}

/// Variant payload of a node.
#[derive(Debug)]
pub enum NodeKind {
    /// Pure transform node used to organize the hierarchy.
    Group,
    Camera(CameraNode),
    Light(LightNode),
    Fog(FogNode),
    Occluder(OccluderNode),
    /// Skeleton joint; carries only a transform.
    Bone,
    Geometry(Box<GeometryNode>),
}

impl NodeKind {
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Group => NodeType::Group,
            Self::Camera(_) => NodeType::Camera,
            Self::Light(_) => NodeType::Light,
            Self::Fog(_) => NodeType::Fog,
            Self::Occluder(_) => NodeType::Occluder,
            Self::Bone => NodeType::Bone,
            Self::Geometry(_) => NodeType::Geometry,
        }
    }
}

/// A spatial element of the world.
///
/// # Hierarchy
///
/// `parent` is `None` for the world root and for overlay nodes, which live in
/// the arena without being part of the tree. Children are kept in insertion
/// order, which is also traversal order.
///
/// # Transform
///
/// `transform` is the node's local transform relative to its parent. The
/// cached world transform and its inverse are refreshed by
/// [`transform_system::update_node`](crate::scene::transform_system::update_node).
#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub transform: Affine3A,
    pub kind: NodeKind,

    pub(crate) world: Transformable,
    pub(crate) controller: Option<ControllerKey>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Affine3A::IDENTITY,
            kind,
            world: Transformable::IDENTITY,
            controller: None,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    #[must_use]
    pub fn bone(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Bone)
    }

    #[must_use]
    pub fn camera(name: impl Into<String>, camera: impl Into<CameraNode>) -> Self {
        Self::new(name, NodeKind::Camera(camera.into()))
    }

    #[must_use]
    pub fn light(name: impl Into<String>, light: LightNode) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    #[must_use]
    pub fn fog(name: impl Into<String>, fog: FogNode) -> Self {
        Self::new(name, NodeKind::Fog(fog))
    }

    #[must_use]
    pub fn occluder(name: impl Into<String>, occluder: OccluderNode) -> Self {
        Self::new(name, NodeKind::Occluder(occluder))
    }

    #[must_use]
    pub fn geometry(name: impl Into<String>, geometry: GeometryNode) -> Self {
        Self::new(name, NodeKind::Geometry(Box::new(geometry)))
    }

    // ========================================================================
    // Builder helpers
    // ========================================================================

    #[must_use]
    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation.into();
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.matrix3 = glam::Mat3A::from_quat(rotation);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    #[inline]
    #[must_use]
    pub fn world(&self) -> &Transformable {
        &self.world
    }

    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> &Affine3A {
        self.world.world_transform()
    }

    #[inline]
    #[must_use]
    pub fn inverse_world_transform(&self) -> &Affine3A {
        self.world.inverse_world_transform()
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world.world_position()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn controller(&self) -> Option<ControllerKey> {
        self.controller
    }

    #[must_use]
    pub fn as_camera(&self) -> Option<&CameraNode> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_frustum_camera(&self) -> Option<&FrustumCamera> {
        self.as_camera().and_then(CameraNode::as_frustum)
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&LightNode> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light_mut(&mut self) -> Option<&mut LightNode> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_fog(&self) -> Option<&FogNode> {
        match &self.kind {
            NodeKind::Fog(fog) => Some(fog),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_occluder(&self) -> Option<&OccluderNode> {
        match &self.kind {
            NodeKind::Occluder(occluder) => Some(occluder),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_geometry(&self) -> Option<&GeometryNode> {
        match &self.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_geometry_mut(&mut self) -> Option<&mut GeometryNode> {
        match &mut self.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }
}
