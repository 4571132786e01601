use bytemuck::{Pod, Zeroable};
use smallvec::smallvec;

use crate::render::device::{AttributeFormat, BufferHandle, VertexAttribute, VertexLayout};

/// Standard mesh vertex: position, normal, tangent (w = handedness), texcoord.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub texcoord: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], tangent: [f32; 4], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tangent,
            texcoord,
        }
    }

    /// Attribute layout of the standard vertex over `buffer`:
    /// location 0 position, 1 normal, 2 tangent, 3 texcoord.
    #[must_use]
    pub fn layout(buffer: BufferHandle) -> VertexLayout {
        let attr = |location, components, offset| VertexAttribute {
            location,
            components,
            format: AttributeFormat::Float32,
            offset,
        };
        VertexLayout {
            buffer,
            stride: Self::STRIDE,
            attributes: smallvec![attr(0, 3, 0), attr(1, 3, 12), attr(2, 4, 24), attr(3, 2, 40)],
        }
    }
}

/// Three 16-bit vertex indices.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Triangle {
    pub index: [u16; 3],
}

impl Triangle {
    #[must_use]
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        Self { index: [a, b, c] }
    }
}
