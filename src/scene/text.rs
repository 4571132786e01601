use bytemuck::Zeroable;

use crate::errors::Result;
use crate::render::device::{GraphicsDevice, Program};
use crate::render::renderable::{BlendMode, Renderable};
use crate::render::vertex::Triangle;
use crate::text::{Font, GlyphVertex, TextLayout, TextShaper};

const TEXT_VERTEX_MAIN: &str = r"
layout(location = 0) in vec4 attrib[5];
uniform vec4 vparam[8];
out vec4 vcolor;
out vec2 texcoord;
flat out vec4 banding;
flat out ivec4 glyph;

void main()
{
    vec2 p;
    GlyphUnpack(attrib[3], glyph);
    p = GlyphDilate(attrib[0], attrib[1], attrib[2], vparam[0], vparam[1], vparam[3], vparam[7].xy, texcoord);
    gl_Position.x = p.x * vparam[0].x + p.y * vparam[0].y + vparam[0].w;
    gl_Position.y = p.x * vparam[1].x + p.y * vparam[1].y + vparam[1].w;
    gl_Position.z = p.x * vparam[2].x + p.y * vparam[2].y + vparam[2].w;
    gl_Position.w = p.x * vparam[3].x + p.y * vparam[3].y + vparam[3].w;
    banding = attrib[3];
    vcolor = attrib[4];
}
";

const TEXT_FRAGMENT_MAIN: &str = r"
uniform sampler2D curveTexture;
uniform usampler2D bandTexture;
in vec4 vcolor;
in vec2 texcoord;
flat in vec4 banding;
flat in ivec4 glyph;
out vec4 fcolor;

void main()
{
    float coverage = GlyphCoverage(curveTexture, bandTexture, texcoord, banding, glyph);
    fcolor = vec4(vcolor.rgb, vcolor.a * coverage);
}
";

const GLSL_VERSION: &str = "#version 330\n";

/// Text payload of a geometry node.
#[derive(Debug, Clone)]
pub struct TextGeometry {
    pub font: Font,
    pub layout: TextLayout,
    text: String,
}

impl TextGeometry {
    #[must_use]
    pub fn new(font: Font, layout: TextLayout) -> Self {
        Self {
            font,
            layout,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render state for text: alpha blending, no depth write, no face
    /// culling, the font textures and a program built from the shaper's
    /// shader fragments.
    pub(crate) fn configure(
        &self,
        renderable: &mut Renderable,
        device: &mut dyn GraphicsDevice,
        shaper: &dyn TextShaper,
    ) -> Result<()> {
        renderable.blend_mode = BlendMode::Alpha;
        renderable.set_depth_write(false);
        renderable.set_cull_face(false);

        renderable.set_texture(0, Some(self.font.curve_texture().clone()));
        renderable.set_texture(1, Some(self.font.band_texture().clone()));
        renderable.set_texture_count(2);

        let program = Program::compile(
            device,
            &[GLSL_VERSION, shaper.vertex_shader_source(), TEXT_VERTEX_MAIN],
            &[GLSL_VERSION, shaper.fragment_shader_source(), TEXT_FRAGMENT_MAIN],
        )?;
        renderable.set_program(0, Some(program));
        Ok(())
    }

    /// Reshapes `text` and replaces the renderable's buffers with the result.
    pub(crate) fn set_text(
        &mut self,
        renderable: &mut Renderable,
        device: &mut dyn GraphicsDevice,
        shaper: &dyn TextShaper,
        text: &str,
    ) -> Result<()> {
        let (max_vertices, max_triangles) = shaper.count_glyph_geometry(&self.font, text);

        let mut vertices = vec![GlyphVertex::zeroed(); max_vertices];
        let mut triangles = vec![Triangle::zeroed(); max_triangles];
        let (vertex_count, triangle_count) =
            shaper.build_glyph_geometry(&self.font, &self.layout, text, &mut vertices, &mut triangles)?;
        let vertex_count = vertex_count.min(max_vertices);
        let triangle_count = triangle_count.min(max_triangles);

        self.text = text.to_string();

        if vertex_count == 0 || triangle_count == 0 {
            renderable.release(device);
            return Ok(());
        }

        renderable.upload_indexed(
            device,
            bytemuck::cast_slice(&vertices[..vertex_count]),
            vertex_count,
            bytemuck::cast_slice(&triangles[..triangle_count]),
            triangle_count * 3,
            GlyphVertex::layout,
        )
    }
}
