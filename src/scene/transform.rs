use glam::{Affine3A, Mat4, Vec3};

/// Cached world transform of a node and its inverse.
///
/// The pair is only ever written together, so the inverse always matches
/// the world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformable {
    world: Affine3A,
    inverse_world: Affine3A,
}

impl Default for Transformable {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformable {
    pub const IDENTITY: Self = Self {
        world: Affine3A::IDENTITY,
        inverse_world: Affine3A::IDENTITY,
    };

    #[must_use]
    pub fn new(world: Affine3A) -> Self {
        Self {
            world,
            inverse_world: world.inverse(),
        }
    }

    pub fn set_identity(&mut self) {
        *self = Self::IDENTITY;
    }

    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> &Affine3A {
        &self.world
    }

    #[inline]
    #[must_use]
    pub fn inverse_world_transform(&self) -> &Affine3A {
        &self.inverse_world
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world.translation.into()
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from(self.world)
    }

    /// Replaces the world transform and recomputes the inverse.
    pub fn set_world_transform(&mut self, world: Affine3A) {
        self.world = world;
        self.inverse_world = world.inverse();
    }

    /// Moves the world origin, leaving the linear part untouched.
    pub fn set_world_position(&mut self, position: Vec3) {
        self.world.translation = position.into();
        self.inverse_world = self.world.inverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn inverse_tracks_world() {
        let mut t = Transformable::default();
        t.set_world_transform(Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, 3.0),
        ));
        let product = *t.world_transform() * *t.inverse_world_transform();
        assert!(product.abs_diff_eq(Affine3A::IDENTITY, 1e-5));

        t.set_world_position(Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(t.world_position(), Vec3::new(-4.0, 0.0, 0.0));
        let local = t.inverse_world_transform().transform_point3(Vec3::new(-4.0, 0.0, 0.0));
        assert!(local.abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
