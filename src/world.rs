//! World Manager
//!
//! [`World`] owns the node tree, the controllers and the flat indices the
//! render loop walks every frame.
//!
//! # Frame
//!
//! ```rust,ignore
//! use umbra::{World, WorldSettings, RecordingDevice};
//!
//! let mut world = World::new(WorldSettings::default());
//! // ... add camera, lights, geometry ...
//! world.preprocess_world();
//!
//! loop {
//!     let stats = world.render_world(&mut device, delta_time);
//!     world.render_overlay(&mut device);
//! }
//! ```
//!
//! # Indexing
//!
//! [`World::preprocess_world`] walks the tree once and rebuilds the light,
//! occluder, geometry and controller indices and selects the active camera
//! (the first frustum camera in pre-order). Nodes added later are not drawn
//! until it runs again. Removed nodes leave stale handles in the indices,
//! which the render loop skips.

use glam::{Mat4, Vec3, Vec4};
use slotmap::SlotMap;

use crate::assets::importer::{ImportedKind, ImportedNode, ImportedScene, SceneImporter};
use crate::controller::{Controller, ControllerContext, ControllerKey};
use crate::errors::{Result, UmbraError};
use crate::render::device::GraphicsDevice;
use crate::render::params::UniversalParams;
use crate::render::{AMBIENT_PROGRAM, LIGHT_PROGRAM};
use crate::scene::camera::{CameraNode, CameraType};
use crate::scene::fog::FogNode;
use crate::scene::geometry::GeometryNode;
use crate::scene::light::LightType;
use crate::scene::node::{Node, NodeKind};
use crate::scene::transform::Transformable;
use crate::scene::{NodeHandle, transform_system, tree};
use crate::settings::WorldSettings;

/// Counters returned by [`World::render_world`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Geometry drawn in the ambient pass (the visible set).
    pub ambient_draw_count: usize,
    /// Geometry draws issued across all light passes.
    pub light_draw_count: usize,
    /// Point lights that received a pass.
    pub light_source_count: usize,
    /// Frustum-visible geometry rejected by an occluder.
    pub occluded_count: usize,
}

pub struct World {
    settings: WorldSettings,

    nodes: SlotMap<NodeHandle, Node>,
    controllers: SlotMap<ControllerKey, Box<dyn Controller>>,
    root: NodeHandle,

    // === Indices (rebuilt by preprocess_world) ===
    camera: Option<NodeHandle>,
    fog: Option<NodeHandle>,
    lights: Vec<NodeHandle>,
    occluders: Vec<NodeHandle>,
    geometries: Vec<NodeHandle>,
    controller_list: Vec<ControllerKey>,

    // === Per-frame scratch ===
    visible_geometry: Vec<NodeHandle>,
    params: UniversalParams,

    // === Overlay ===
    overlay_camera: Option<CameraNode>,
    overlay_geometry: Vec<NodeHandle>,
}

impl World {
    #[must_use]
    pub fn new(settings: WorldSettings) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::group("root"));
        Self {
            settings,
            nodes,
            controllers: SlotMap::with_key(),
            root,
            camera: None,
            fog: None,
            lights: Vec::new(),
            occluders: Vec::new(),
            geometries: Vec::new(),
            controller_list: Vec::new(),
            visible_geometry: Vec::new(),
            params: UniversalParams::default(),
            overlay_camera: None,
            overlay_geometry: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorldSettings {
        &mut self.settings
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn nodes(&self) -> &SlotMap<NodeHandle, Node> {
        &self.nodes
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Inserts `node` as the last child of `parent`.
    pub fn add_node(&mut self, parent: NodeHandle, mut node: Node) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(UmbraError::InvalidNode(format!(
                "parent of '{}' does not exist",
                node.name
            )));
        }
        node.parent = Some(parent);
        node.children.clear();
        node.controller = None;
        let handle = self.nodes.insert(node);
        self.nodes[parent].children.push(handle);
        Ok(handle)
    }

    /// Moves `child` (and its subtree) under `new_parent`.
    pub fn attach(&mut self, child: NodeHandle, new_parent: NodeHandle) -> Result<()> {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(new_parent) {
            return Err(UmbraError::InvalidNode("attach with stale handle".to_string()));
        }
        if child == self.root {
            return Err(UmbraError::InvalidHierarchy("the root cannot be re-parented".to_string()));
        }
        if child == new_parent {
            log::warn!("Attempted to attach node '{}' to itself", self.nodes[child].name);
            return Err(UmbraError::InvalidHierarchy("node attached to itself".to_string()));
        }
        if tree::is_ancestor_or_self(&self.nodes, child, new_parent) {
            return Err(UmbraError::InvalidHierarchy(format!(
                "'{}' is an ancestor of the new parent",
                self.nodes[child].name
            )));
        }

        if let Some(old_parent) = self.nodes[child].parent
            && let Some(parent) = self.nodes.get_mut(old_parent)
        {
            parent.children.retain(|&c| c != child);
        }
        self.overlay_geometry.retain(|&h| h != child);

        self.nodes[child].parent = Some(new_parent);
        self.nodes[new_parent].children.push(child);
        Ok(())
    }

    /// Destroys `handle` and its subtree, children before parents.
    ///
    /// Controllers attached to removed nodes are dropped and geometry GPU
    /// objects are returned to `device`.
    pub fn remove_node(&mut self, handle: NodeHandle, device: &mut dyn GraphicsDevice) -> Result<()> {
        if handle == self.root {
            return Err(UmbraError::InvalidHierarchy("the root cannot be removed".to_string()));
        }
        let Some(node) = self.nodes.get(handle) else {
            return Err(UmbraError::InvalidNode("remove of stale handle".to_string()));
        };

        if let Some(parent) = node.parent
            && let Some(parent) = self.nodes.get_mut(parent)
        {
            parent.children.retain(|&c| c != handle);
        }
        self.overlay_geometry.retain(|&h| h != handle);

        let mut subtree = tree::descendants(&self.nodes, handle);
        subtree.insert(0, handle);

        for h in subtree.into_iter().rev() {
            let Some(mut node) = self.nodes.remove(h) else {
                continue;
            };
            if let Some(key) = node.controller {
                self.controllers.remove(key);
            }
            if let NodeKind::Geometry(geometry) = &mut node.kind {
                geometry.release(device);
            }
            if self.camera == Some(h) {
                self.camera = None;
            }
            if self.fog == Some(h) {
                self.fog = None;
            }
        }
        device.collect_released();
        Ok(())
    }

    /// Recomputes world transforms of `handle` and its subtree from the
    /// parent's current world transform.
    pub fn update_node(&mut self, handle: NodeHandle) {
        transform_system::update_node(&mut self.nodes, handle);
    }

    /// First descendant of the root named `name`.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        tree::find_node(&self.nodes, self.root, name)
    }

    /// First descendant of `start` (excluding `start`) named `name`.
    #[must_use]
    pub fn find_node_in(&self, start: NodeHandle, name: &str) -> Option<NodeHandle> {
        tree::find_node(&self.nodes, start, name)
    }

    // ========================================================================
    // Controllers
    // ========================================================================

    /// Attaches `controller` to its target node, replacing any previous one.
    pub fn attach_controller(&mut self, controller: impl Controller + 'static) -> Result<ControllerKey> {
        let target = controller.target();
        if !self.nodes.contains_key(target) {
            return Err(UmbraError::InvalidNode("controller target does not exist".to_string()));
        }
        controller.validate(&self.nodes)?;

        let key = self.controllers.insert(Box::new(controller));
        if let Some(old) = self.nodes[target].controller.replace(key) {
            self.controllers.remove(old);
        }
        Ok(key)
    }

    #[must_use]
    pub fn controller(&self, key: ControllerKey) -> Option<&dyn Controller> {
        self.controllers.get(key).map(|c| &**c)
    }

    pub fn controller_mut(&mut self, key: ControllerKey) -> Option<&mut dyn Controller> {
        match self.controllers.get_mut(key) {
            Some(controller) => Some(&mut **controller),
            None => None,
        }
    }

    // ========================================================================
    // Overlay
    // ========================================================================

    pub fn set_overlay_camera(&mut self, camera: Option<CameraNode>) {
        self.overlay_camera = camera;
    }

    #[must_use]
    pub fn overlay_camera(&self) -> Option<&CameraNode> {
        self.overlay_camera.as_ref()
    }

    /// Adds a geometry node outside the tree, drawn by [`World::render_overlay`].
    pub fn add_overlay_geometry(&mut self, mut node: Node) -> NodeHandle {
        node.parent = None;
        node.children.clear();
        let handle = self.nodes.insert(node);
        self.overlay_geometry.push(handle);
        handle
    }

    #[must_use]
    pub fn overlay_geometry(&self) -> &[NodeHandle] {
        &self.overlay_geometry
    }

    // ========================================================================
    // Indices
    // ========================================================================

    #[must_use]
    pub fn active_camera(&self) -> Option<NodeHandle> {
        self.camera
    }

    #[must_use]
    pub fn fog_node(&self) -> Option<NodeHandle> {
        self.fog
    }

    #[must_use]
    pub fn lights(&self) -> &[NodeHandle] {
        &self.lights
    }

    #[must_use]
    pub fn occluders(&self) -> &[NodeHandle] {
        &self.occluders
    }

    #[must_use]
    pub fn geometries(&self) -> &[NodeHandle] {
        &self.geometries
    }

    #[must_use]
    pub fn registered_controllers(&self) -> &[ControllerKey] {
        &self.controller_list
    }

    /// Geometry that passed culling in the last frame, in draw order.
    #[must_use]
    pub fn visible_geometry(&self) -> &[NodeHandle] {
        &self.visible_geometry
    }

    /// Parameter block as last published.
    #[must_use]
    pub fn universal_params(&self) -> &UniversalParams {
        &self.params
    }

    // ========================================================================
    // Preprocess
    // ========================================================================

    /// Walks the tree in pre-order and rebuilds every index.
    ///
    /// Safe to call again after the tree changed.
    pub fn preprocess_world(&mut self) {
        self.camera = None;
        self.fog = None;
        self.lights.clear();
        self.occluders.clear();
        self.geometries.clear();
        self.controller_list.clear();
        self.visible_geometry.clear();

        for handle in tree::descendants(&self.nodes, self.root) {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };

            match &node.kind {
                NodeKind::Geometry(_) => self.geometries.push(handle),
                NodeKind::Light(_) => self.lights.push(handle),
                NodeKind::Occluder(_) => self.occluders.push(handle),
                NodeKind::Camera(camera) => {
                    if camera.camera_type() == CameraType::Frustum {
                        if self.camera.is_none() {
                            self.camera = Some(handle);
                        } else {
                            log::warn!("Ignoring additional frustum camera '{}'", node.name);
                        }
                    }
                }
                NodeKind::Fog(_) => {
                    if self.fog.is_some() {
                        log::warn!("Multiple fog nodes, '{}' replaces the previous one", node.name);
                    }
                    self.fog = Some(handle);
                }
                NodeKind::Group | NodeKind::Bone => {}
            }

            if let Some(key) = node.controller
                && let Some(controller) = self.controllers.get_mut(key)
            {
                controller.preprocess(&self.nodes);
                self.controller_list.push(key);
            }
        }

        if let Some(handle) = self.camera
            && let Some(Node {
                kind: NodeKind::Camera(camera),
                ..
            }) = self.nodes.get_mut(handle)
            && let Some(frustum) = camera.as_frustum_mut()
        {
            frustum.depth_range = self.settings.depth_range;
        }

        for &handle in &self.overlay_geometry {
            if let Some(node) = self.nodes.get_mut(handle) {
                let local = node.transform;
                node.world.set_world_transform(local);
            }
        }

        log::info!(
            "Preprocessed world: {} geometry, {} lights, {} occluders, {} controllers, camera: {}",
            self.geometries.len(),
            self.lights.len(),
            self.occluders.len(),
            self.controller_list.len(),
            if self.camera.is_some() { "yes" } else { "none" }
        );
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Runs one frame: controllers, transform propagation, culling, the
    /// ambient pass and one additive pass per visible point light.
    ///
    /// Without an active camera nothing happens and zeroed stats are returned.
    pub fn render_world(&mut self, device: &mut dyn GraphicsDevice, delta_time: f32) -> RenderStats {
        device.collect_released();

        let mut stats = RenderStats::default();
        let Some(camera_handle) = self.camera.filter(|&h| self.nodes.contains_key(h)) else {
            return stats;
        };

        // Controllers move, transforms propagate, flagged controllers update
        {
            let mut ctx = ControllerContext {
                nodes: &mut self.nodes,
                device: &mut *device,
                settings: &self.settings,
                delta_time,
            };
            for &key in &self.controller_list {
                if let Some(controller) = self.controllers.get_mut(key) {
                    controller.move_controller(&mut ctx);
                }
            }

            transform_system::update_node(ctx.nodes, self.root);

            for &key in &self.controller_list {
                if let Some(controller) = self.controllers.get_mut(key)
                    && controller.update_flag()
                {
                    controller.set_update_flag(false);
                    controller.update_controller(&mut ctx);
                }
            }
        }

        let camera_node = &self.nodes[camera_handle];
        let Some(camera) = camera_node.as_frustum_camera() else {
            return stats;
        };
        let camera = *camera;
        let camera_world = camera_node.world;
        let camera_position = camera_world.world_position();

        self.publish_frame_params(&camera_world);
        device.update_universal_params(&self.params);

        for &handle in &self.occluders {
            if let Some(Node {
                world,
                kind: NodeKind::Occluder(occluder),
                ..
            }) = self.nodes.get_mut(handle)
            {
                occluder.calculate_occluder_planes(world, camera_position);
            }
        }

        let view_projection = camera.projection_matrix() * Mat4::from(*camera_world.inverse_world_transform());
        let viewport = device.viewport_size();

        // Culling
        self.visible_geometry.clear();
        for &handle in &self.geometries {
            let Some(node) = self.nodes.get(handle) else {
                log::trace!("Skipping stale geometry handle");
                continue;
            };
            let Some(geometry) = node.as_geometry() else {
                continue;
            };
            if !geometry.visible(&node.world, &camera) {
                continue;
            }
            if self.settings.occlusion_culling
                && self
                    .occluders
                    .iter()
                    .filter_map(|&h| self.nodes.get(h).and_then(Node::as_occluder))
                    .any(|occluder| geometry.occluded(&node.world, occluder))
            {
                stats.occluded_count += 1;
                continue;
            }
            self.visible_geometry.push(handle);
        }

        // Ambient pass
        for &handle in &self.visible_geometry {
            if let Some(Node {
                world,
                kind: NodeKind::Geometry(geometry),
                ..
            }) = self.nodes.get_mut(handle)
            {
                geometry.prepare_to_render(world, &view_projection, viewport);
                geometry.renderable.render(AMBIENT_PROGRAM, device);
            }
        }
        stats.ambient_draw_count = self.visible_geometry.len();

        // Light passes
        for &light_handle in &self.lights {
            let Some(light_node) = self.nodes.get(light_handle) else {
                continue;
            };
            let Some(light) = light_node.as_light().copied() else {
                continue;
            };
            let light_position = light_node.world_position();

            if light.light_type() != LightType::Point || !light.light_visible(light_position, &camera) {
                continue;
            }
            stats.light_source_count += 1;

            self.params.light_color = light.color;
            self.params.light_position = light_position.extend(1.0);
            self.params.atten_const = light.attenuation_constants();
            device.update_universal_params(&self.params);

            for &handle in &self.visible_geometry {
                if let Some(Node {
                    world,
                    kind: NodeKind::Geometry(geometry),
                    ..
                }) = self.nodes.get_mut(handle)
                    && geometry.illuminated(world, &light, light_position)
                {
                    geometry.prepare_to_render(world, &view_projection, viewport);
                    geometry.renderable.render(LIGHT_PROGRAM, device);
                    stats.light_draw_count += 1;
                }
            }
        }

        log::debug!(
            "Frame: {} ambient, {} light draws over {} lights, {} occluded",
            stats.ambient_draw_count,
            stats.light_draw_count,
            stats.light_source_count,
            stats.occluded_count
        );
        stats
    }

    fn publish_frame_params(&mut self, camera_world: &Transformable) {
        let world = camera_world.world_transform();
        self.params.camera_position = world.translation.extend(1.0);
        self.params.camera_right = world.matrix3.x_axis.extend(0.0);
        self.params.camera_down = world.matrix3.y_axis.extend(0.0);
        self.params.ambient_color = self.settings.ambient_color;

        let fog = self
            .fog
            .and_then(|h| self.nodes.get(h))
            .and_then(|node| node.as_fog().map(|fog| (fog, node.inverse_world_transform())));
        match fog {
            Some((fog, inverse)) => {
                let plane = FogNode::fog_plane(inverse);
                self.params.fog_plane = plane;
                self.params.fog_color = fog.color;
                self.params.fog_params = fog.fog_params(plane, Vec3::from(world.translation));
            }
            None => {
                self.params.fog_plane = Vec4::ZERO;
                self.params.fog_color = Vec4::ZERO;
                self.params.fog_params = Vec4::ZERO;
            }
        }
    }

    /// Draws every overlay geometry with the overlay camera's projection.
    ///
    /// Returns the number of draws, zero when no overlay camera is set.
    pub fn render_overlay(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        let Some(camera) = self.overlay_camera else {
            return 0;
        };
        let projection = camera.projection_matrix();
        let viewport = device.viewport_size();

        let mut drawn = 0;
        for &handle in &self.overlay_geometry {
            if let Some(Node {
                world,
                kind: NodeKind::Geometry(geometry),
                ..
            }) = self.nodes.get_mut(handle)
            {
                geometry.prepare_to_render(world, &projection, viewport);
                geometry.renderable.render(AMBIENT_PROGRAM, device);
                drawn += 1;
            }
        }
        drawn
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Builds the scene named `name` under `parent`.
    ///
    /// The imported nodes are not indexed until the next
    /// [`preprocess_world`](Self::preprocess_world).
    pub fn import_scene(
        &mut self,
        parent: NodeHandle,
        importer: &mut dyn SceneImporter,
        name: &str,
        device: &mut dyn GraphicsDevice,
    ) -> Result<ImportedScene> {
        let description = importer.import(name)?;
        let mut meshes = Vec::new();
        let root = self.build_imported(parent, description, device, &mut meshes)?;
        log::info!("Imported scene '{name}' with {} meshes", meshes.len());
        Ok(ImportedScene { root, meshes })
    }

    fn build_imported(
        &mut self,
        parent: NodeHandle,
        imported: ImportedNode,
        device: &mut dyn GraphicsDevice,
        meshes: &mut Vec<NodeHandle>,
    ) -> Result<NodeHandle> {
        let ImportedNode {
            name,
            transform,
            kind,
            children,
        } = imported;

        let is_mesh = matches!(kind, ImportedKind::Mesh { .. });
        let node = match kind {
            ImportedKind::Group => Node::group(name),
            ImportedKind::Bone => Node::bone(name),
            ImportedKind::Mesh { vertices, triangles } => {
                Node::geometry(name, GeometryNode::mesh(device, vertices, triangles)?)
            }
        };
        let handle = self.add_node(parent, node.with_transform(transform))?;
        if is_mesh {
            meshes.push(handle);
        }

        for child in children {
            self.build_imported(handle, child, device, meshes)?;
        }
        Ok(handle)
    }
}
