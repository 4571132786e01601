use glam::{Mat3A, Vec3};

use crate::controller::{Controller, ControllerContext, ControllerState, ControllerType};
use crate::scene::NodeHandle;

/// Revolves its target around the parent's origin about a fixed axis.
///
/// Each frame the target's local translation is rotated by
/// `delta_time × light_revolution_rate` radians.
#[derive(Debug, Clone)]
pub struct LightController {
    state: ControllerState,
    axis: Vec3,
}

impl LightController {
    /// Revolution about `axis` (normalized here).
    #[must_use]
    pub fn new(target: NodeHandle, axis: Vec3) -> Self {
        Self {
            state: ControllerState::new(target),
            axis: axis.normalize_or(Vec3::Z),
        }
    }

    /// Revolution about a uniformly distributed random axis.
    #[must_use]
    pub fn with_random_axis(target: NodeHandle) -> Self {
        Self::new(target, random_unit_vector())
    }

    #[must_use]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }
}

impl Controller for LightController {
    fn controller_type(&self) -> ControllerType {
        ControllerType::LightRevolution
    }

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn move_controller(&mut self, ctx: &mut ControllerContext<'_>) {
        let Some(node) = ctx.nodes.get_mut(self.state.target()) else {
            log::warn!("Light controller target is stale, skipping");
            return;
        };
        let angle = ctx.delta_time * ctx.settings.light_revolution_rate;
        let rotation = Mat3A::from_axis_angle(self.axis, angle);
        node.transform.translation = rotation * node.transform.translation;
        log::trace!("Revolved '{}' by {angle} rad", node.name);
    }
}

/// Rejection-sampled point on the unit sphere.
fn random_unit_vector() -> Vec3 {
    loop {
        let v = Vec3::new(
            rand::random::<f32>() * 2.0 - 1.0,
            rand::random::<f32>() * 2.0 - 1.0,
            rand::random::<f32>() * 2.0 - 1.0,
        );
        let length_squared = v.length_squared();
        if length_squared > 1.0e-4 && length_squared <= 1.0 {
            return v / length_squared.sqrt();
        }
    }
}
