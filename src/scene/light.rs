use glam::{Affine3A, Vec3, Vec4};

use crate::scene::camera::FrustumCamera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Infinite,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Directional light along the node's world z axis.
    Infinite,
    /// Omnidirectional light with a finite range.
    Point { range: f32 },
}

/// Light payload of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightNode {
    pub color: Vec4,
    pub kind: LightKind,
}

impl LightNode {
    #[must_use]
    pub fn infinite(color: Vec4) -> Self {
        Self {
            color,
            kind: LightKind::Infinite,
        }
    }

    #[must_use]
    pub fn point(color: Vec4, range: f32) -> Self {
        Self {
            color,
            kind: LightKind::Point { range },
        }
    }

    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Infinite => LightType::Infinite,
            LightKind::Point { .. } => LightType::Point,
        }
    }

    #[must_use]
    pub fn range(&self) -> Option<f32> {
        match self.kind {
            LightKind::Point { range } => Some(range),
            LightKind::Infinite => None,
        }
    }

    /// Whether any part of the light's area of influence can be on screen.
    ///
    /// Infinite lights always are; a point light is tested as a sphere of
    /// its range around `position`.
    #[must_use]
    pub fn light_visible(&self, position: Vec3, camera: &FrustumCamera) -> bool {
        match self.kind {
            LightKind::Infinite => true,
            LightKind::Point { range } => camera.sphere_visible(position, range),
        }
    }

    /// Always `true`: no light-space culling is performed yet.
    #[must_use]
    pub fn sphere_illuminated(&self, _position: Vec3, _center: Vec3, _radius: f32) -> bool {
        true
    }

    /// Always `true`: no light-space culling is performed yet.
    #[must_use]
    pub fn box_illuminated(&self, _position: Vec3, _transform: &Affine3A, _size: Vec3) -> bool {
        true
    }

    /// Attenuation constants `(-4/r², 1.01865736, 0.01865736, 0)` for a point
    /// light of range `r`; zero for infinite lights.
    ///
    /// The shader evaluates `saturate((exp(x·d²) · y) - z)` with `d` the
    /// distance to the light, which reaches zero exactly at `d = r`.
    #[must_use]
    pub fn attenuation_constants(&self) -> Vec4 {
        match self.kind {
            LightKind::Point { range } => {
                Vec4::new(-4.0 / (range * range), 1.018_657_4, 0.018_657_36, 0.0)
            }
            LightKind::Infinite => Vec4::ZERO,
        }
    }
}
