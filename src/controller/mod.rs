//! Controllers
//!
//! A controller animates the node it is attached to. Each frame the world:
//!
//! 1. calls [`Controller::move_controller`] on every registered controller,
//!    before transforms are propagated;
//! 2. propagates world transforms through the whole tree;
//! 3. for every controller whose update flag is raised, clears the flag and
//!    calls [`Controller::update_controller`], which sees the fresh world
//!    transforms.
//!
//! Controllers live in a keyed arena next to the nodes, so a controller can
//! read or write any node (not only its target) through
//! [`ControllerContext`].

pub mod light_revolution;
pub mod skin;

pub use light_revolution::LightController;
pub use skin::{BoneWeight, SkinController};

use slotmap::{SlotMap, new_key_type};

use crate::errors::Result;
use crate::render::device::GraphicsDevice;
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::settings::WorldSettings;

new_key_type! {
    /// Handle of a controller registered with a [`World`](crate::World).
    pub struct ControllerKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    LightRevolution,
    Skin,
    Custom,
}

/// State shared by every controller: its target and the update flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    target: NodeHandle,
    pub update_flag: bool,
}

impl ControllerState {
    #[must_use]
    pub fn new(target: NodeHandle) -> Self {
        Self {
            target,
            update_flag: false,
        }
    }

    #[must_use]
    pub fn target(&self) -> NodeHandle {
        self.target
    }
}

/// Mutable frame context handed to controllers.
pub struct ControllerContext<'a> {
    pub nodes: &'a mut SlotMap<NodeHandle, Node>,
    pub device: &'a mut dyn GraphicsDevice,
    pub settings: &'a WorldSettings,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

pub trait Controller: std::fmt::Debug {
    fn controller_type(&self) -> ControllerType;

    fn state(&self) -> &ControllerState;

    fn state_mut(&mut self) -> &mut ControllerState;

    #[inline]
    fn target(&self) -> NodeHandle {
        self.state().target()
    }

    #[inline]
    fn update_flag(&self) -> bool {
        self.state().update_flag
    }

    #[inline]
    fn set_update_flag(&mut self, flag: bool) {
        self.state_mut().update_flag = flag;
    }

    /// Checks the binding against the node arena when the controller is attached.
    fn validate(&self, _nodes: &SlotMap<NodeHandle, Node>) -> Result<()> {
        Ok(())
    }

    /// One-time setup during world preprocessing.
    fn preprocess(&mut self, _nodes: &SlotMap<NodeHandle, Node>) {}

    /// Per-frame animation step, run before transform propagation.
    fn move_controller(&mut self, _ctx: &mut ControllerContext<'_>) {}

    /// Deferred work, run after transform propagation when the flag was raised.
    fn update_controller(&mut self, _ctx: &mut ControllerContext<'_>) {}
}
