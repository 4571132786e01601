//! Font Collaborator Contract
//!
//! Glyph outlines are rendered directly from two font textures (curve data
//! and band data) by a font-shaping library. The core only needs the
//! contract below: how much geometry a string needs, how to fill it, and the
//! shader source fragments that decode it.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use smallvec::smallvec;

use crate::errors::Result;
use crate::render::device::{AttributeFormat, BufferHandle, Texture, VertexAttribute, VertexLayout};
use crate::render::vertex::Triangle;

/// A font as seen by the renderer: its curve and band textures.
///
/// Cloning shares the textures.
#[derive(Debug, Clone)]
pub struct Font {
    pub name: String,
    curve_texture: Arc<Texture>,
    band_texture: Arc<Texture>,
}

impl Font {
    #[must_use]
    pub fn new(name: impl Into<String>, curve_texture: Arc<Texture>, band_texture: Arc<Texture>) -> Self {
        Self {
            name: name.into(),
            curve_texture,
            band_texture,
        }
    }

    #[must_use]
    pub fn curve_texture(&self) -> &Arc<Texture> {
        &self.curve_texture
    }

    #[must_use]
    pub fn band_texture(&self) -> &Arc<Texture> {
        &self.band_texture
    }
}

/// Glyph vertex produced by the shaper: four packed float4 attributes
/// (position/texcoord, scale/offset, inverse jacobian, band data) and an
/// RGBA8 color.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    pub attributes: [[f32; 4]; 4],
    pub color: [u8; 4],
}

impl GlyphVertex {
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    #[must_use]
    pub fn layout(buffer: BufferHandle) -> VertexLayout {
        let float4 = |location: u32| VertexAttribute {
            location,
            components: 4,
            format: AttributeFormat::Float32,
            offset: location * 16,
        };
        VertexLayout {
            buffer,
            stride: Self::STRIDE,
            attributes: smallvec![
                float4(0),
                float4(1),
                float4(2),
                float4(3),
                VertexAttribute {
                    location: 4,
                    components: 4,
                    format: AttributeFormat::Uint8Normalized,
                    offset: 64,
                },
            ],
        }
    }
}

/// Layout request passed to the shaper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    /// Em size in world units.
    pub font_size: f32,
    pub color: [u8; 4],
}

/// Font-shaping collaborator.
pub trait TextShaper {
    /// Upper bounds on the glyph vertex and triangle counts for `text`.
    fn count_glyph_geometry(&self, font: &Font, text: &str) -> (usize, usize);

    /// Fills glyph geometry for `text`, returning the vertex and triangle
    /// counts actually written. The slices are at least as large as the
    /// bounds returned by [`count_glyph_geometry`](Self::count_glyph_geometry).
    fn build_glyph_geometry(
        &self,
        font: &Font,
        layout: &TextLayout,
        text: &str,
        vertices: &mut [GlyphVertex],
        triangles: &mut [Triangle],
    ) -> Result<(usize, usize)>;

    /// Vertex-stage prolog declaring the glyph decoding functions.
    fn vertex_shader_source(&self) -> &str;

    /// Fragment-stage prolog declaring the glyph coverage functions.
    fn fragment_shader_source(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_layout_packs_color_last() {
        assert_eq!(GlyphVertex::STRIDE, 68);
        let layout = GlyphVertex::layout(BufferHandle::default());
        assert_eq!(layout.attributes.len(), 5);
        assert_eq!(layout.attributes[4].offset, 64);
        assert_eq!(layout.attributes[4].format, AttributeFormat::Uint8Normalized);
    }
}
