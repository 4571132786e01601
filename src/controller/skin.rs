use glam::{Affine3A, Mat3A, Vec3};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::controller::{Controller, ControllerContext, ControllerState, ControllerType};
use crate::errors::{Result, UmbraError};
use crate::render::vertex::Vertex;
use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Influence of one bone on one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Index into the controller's bone list.
    pub bone: u16,
    pub weight: f32,
}

/// Linear-blend skinning of a mesh geometry.
///
/// The target is the mesh node. Bones are ordinary nodes (usually
/// [`NodeKind::Bone`](crate::NodeKind::Bone)) anywhere in the tree; their
/// propagated world transforms drive the deformation.
#[derive(Debug, Clone)]
pub struct SkinController {
    state: ControllerState,

    // bones[i] pairs with inverse_bind[i]
    bones: Vec<NodeHandle>,
    inverse_bind: Vec<Affine3A>,
    weights: Vec<SmallVec<[BoneWeight; 4]>>,

    // Runtime data, sized during preprocessing
    transform_table: Vec<Affine3A>,
    normal_table: Vec<Option<Mat3A>>,
    skinned: Vec<Vertex>,
}

impl SkinController {
    /// Binds `mesh` to `bones`. `weights[v]` lists the influences of vertex `v`.
    pub fn new(
        mesh: NodeHandle,
        bones: Vec<NodeHandle>,
        inverse_bind: Vec<Affine3A>,
        weights: Vec<SmallVec<[BoneWeight; 4]>>,
    ) -> Result<Self> {
        if bones.len() != inverse_bind.len() {
            return Err(UmbraError::InvalidSkin(format!(
                "{} bones but {} inverse bind transforms",
                bones.len(),
                inverse_bind.len()
            )));
        }
        if let Some(bad) = weights.iter().flatten().find(|w| usize::from(w.bone) >= bones.len()) {
            return Err(UmbraError::InvalidSkin(format!(
                "weight references bone {} of {}",
                bad.bone,
                bones.len()
            )));
        }

        let mut state = ControllerState::new(mesh);
        state.update_flag = true;

        Ok(Self {
            state,
            bones,
            inverse_bind,
            weights,
            transform_table: Vec::new(),
            normal_table: Vec::new(),
            skinned: Vec::new(),
        })
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Per-bone skinning transforms from the last update
    /// (`mesh_inverse_world × bone_world × inverse_bind`).
    #[must_use]
    pub fn transform_table(&self) -> &[Affine3A] {
        &self.transform_table
    }

    fn compute_transform_table(&mut self, nodes: &SlotMap<NodeHandle, Node>, mesh_inverse: &Affine3A) {
        for (i, &bone) in self.bones.iter().enumerate() {
            let skin = match nodes.get(bone) {
                Some(bone_node) => *mesh_inverse * *bone_node.world_transform() * self.inverse_bind[i],
                None => Affine3A::IDENTITY,
            };
            self.transform_table[i] = skin;
            self.normal_table[i] = normal_matrix(&skin);
            if self.normal_table[i].is_none() {
                log::warn!("Skin bone {i} has a singular transform, keeping bind normals");
            }
        }
    }

    fn blend_vertex(&self, bind: &Vertex, influences: &[BoneWeight]) -> Vertex {
        let total: f32 = influences.iter().map(|w| w.weight).sum();
        if influences.is_empty() || total <= f32::EPSILON {
            return *bind;
        }

        let position = Vec3::from(bind.position);
        let normal = Vec3::from(bind.normal);
        let tangent = Vec3::new(bind.tangent[0], bind.tangent[1], bind.tangent[2]);

        let mut p = Vec3::ZERO;
        let mut n = Vec3::ZERO;
        let mut t = Vec3::ZERO;
        for influence in influences {
            let bone = usize::from(influence.bone);
            let w = influence.weight / total;
            p += self.transform_table[bone].transform_point3(position) * w;
            n += match self.normal_table[bone] {
                Some(m) => Vec3::from(m * glam::Vec3A::from(normal)),
                None => normal,
            } * w;
            t += self.transform_table[bone].transform_vector3(tangent) * w;
        }

        let n = n.normalize_or_zero();
        let t = t.normalize_or_zero();
        Vertex::new(
            p.to_array(),
            n.to_array(),
            [t.x, t.y, t.z, bind.tangent[3]],
            bind.texcoord,
        )
    }
}

/// Inverse-transpose of the linear part, or `None` when it cannot be inverted.
fn normal_matrix(skin: &Affine3A) -> Option<Mat3A> {
    if skin.matrix3.determinant() == 0.0 {
        return None;
    }
    let m = skin.matrix3.inverse().transpose();
    m.is_finite().then_some(m)
}

impl Controller for SkinController {
    fn controller_type(&self) -> ControllerType {
        ControllerType::Skin
    }

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn validate(&self, nodes: &SlotMap<NodeHandle, Node>) -> Result<()> {
        let node = nodes
            .get(self.state.target())
            .ok_or_else(|| UmbraError::InvalidNode("skin target".to_string()))?;
        let mesh = node
            .as_geometry()
            .and_then(|g| g.as_mesh())
            .ok_or(UmbraError::NodeTypeMismatch {
                expected: "mesh geometry",
                found: node.node_type().as_str(),
            })?;
        if mesh.vertices().len() != self.weights.len() {
            return Err(UmbraError::InvalidSkin(format!(
                "mesh has {} vertices but {} weight lists were given",
                mesh.vertices().len(),
                self.weights.len()
            )));
        }
        Ok(())
    }

    fn preprocess(&mut self, _nodes: &SlotMap<NodeHandle, Node>) {
        self.transform_table = vec![Affine3A::IDENTITY; self.bones.len()];
        self.normal_table = vec![Some(Mat3A::IDENTITY); self.bones.len()];
    }

    fn move_controller(&mut self, _ctx: &mut ControllerContext<'_>) {
        // Bones may move every frame
        self.state.update_flag = true;
    }

    fn update_controller(&mut self, ctx: &mut ControllerContext<'_>) {
        if self.transform_table.len() != self.bones.len() {
            self.preprocess(ctx.nodes);
        }

        let nodes = &*ctx.nodes;
        let Some(mesh_node) = nodes.get(self.state.target()) else {
            log::warn!("Skin controller target is stale, skipping");
            return;
        };
        let Some(geometry) = mesh_node.as_geometry() else {
            return;
        };
        let (Some(mesh), Some(vertex_buffer)) = (geometry.as_mesh(), geometry.renderable.vertex_buffer()) else {
            return;
        };

        let mesh_inverse = *mesh_node.inverse_world_transform();
        self.compute_transform_table(nodes, &mesh_inverse);

        let mut skinned = std::mem::take(&mut self.skinned);
        skinned.clear();
        skinned.extend(mesh.vertices().iter().enumerate().map(|(i, bind)| {
            let influences = self.weights.get(i).map_or(&[][..], |w| w.as_slice());
            self.blend_vertex(bind, influences)
        }));

        if let Err(err) = ctx.device.write_buffer(vertex_buffer, 0, bytemuck::cast_slice(&skinned)) {
            log::error!("Failed to upload skinned vertices for '{}': {err}", mesh_node.name);
        }
        log::trace!("Skinned {} vertices with {} bones", skinned.len(), self.bones.len());
        self.skinned = skinned;
    }
}
