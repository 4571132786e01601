//! Scene-description import.
//!
//! File parsing belongs to the host; an importer hands the world a plain
//! node tree to instantiate.

use glam::Affine3A;

use crate::errors::Result;
use crate::render::vertex::{Triangle, Vertex};
use crate::scene::NodeHandle;

#[derive(Debug, Clone)]
pub enum ImportedKind {
    Group,
    Bone,
    Mesh {
        vertices: Vec<Vertex>,
        triangles: Vec<Triangle>,
    },
}

/// One node of an imported scene description.
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    pub transform: Affine3A,
    pub kind: ImportedKind,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ImportedKind) -> Self {
        Self {
            name: name.into(),
            transform: Affine3A::IDENTITY,
            kind,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Result of [`World::import_scene`](crate::World::import_scene).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedScene {
    /// Node created for the description's root.
    pub root: NodeHandle,
    /// Every mesh geometry node created, in pre-order.
    pub meshes: Vec<NodeHandle>,
}

/// Scene-description collaborator.
pub trait SceneImporter {
    /// Produces the node tree of the scene named `name`.
    fn import(&mut self, name: &str) -> Result<ImportedNode>;
}
