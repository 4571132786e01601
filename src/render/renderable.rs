use std::sync::Arc;

use bitflags::bitflags;
use glam::Vec4;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::render::device::{
    BufferHandle, DrawCall, GraphicsDevice, Program, Texture, TextureHandle, VertexArrayHandle,
    VertexLayout,
};
use crate::render::vertex::{Triangle, Vertex};

pub const MAX_VERTEX_BUFFERS: usize = 1;
pub const MAX_PROGRAMS: usize = 2;
pub const MAX_TEXTURES: usize = 4;
pub const MAX_VERTEX_PARAMS: usize = 16;
pub const MAX_FRAGMENT_PARAMS: usize = 16;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const DEPTH_WRITE = 1 << 0;
        const CULL_FACE   = 1 << 1;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::DEPTH_WRITE | Self::CULL_FACE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Replace,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    #[default]
    IndexedTriangleList,
    TriangleList,
    TriangleStrip,
}

/// Render state and GPU objects of one drawable.
///
/// Buffers and the vertex array are owned exclusively and must be returned
/// with [`Renderable::release`]. Programs and textures are shared.
#[derive(Debug, Default)]
pub struct Renderable {
    pub primitive: PrimitiveType,
    pub blend_mode: BlendMode,
    pub flags: RenderFlags,

    vertex_count: u32,
    index_count: u32,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    vertex_array: Option<VertexArrayHandle>,

    programs: [Option<Arc<Program>>; MAX_PROGRAMS],
    textures: [Option<Arc<Texture>>; MAX_TEXTURES],
    texture_count: usize,

    pub vertex_params: [Vec4; MAX_VERTEX_PARAMS],
    pub vertex_param_count: usize,
    pub vertex_param_location: u32,
    pub fragment_params: [Vec4; MAX_FRAGMENT_PARAMS],
    pub fragment_param_count: usize,
    pub fragment_param_location: u32,
}

impl Renderable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.flags.set(RenderFlags::DEPTH_WRITE, enabled);
    }

    pub fn set_cull_face(&mut self, enabled: bool) {
        self.flags.set(RenderFlags::CULL_FACE, enabled);
    }

    /// Assigns the program for a pass slot. The previous program, if any, is released.
    pub fn set_program(&mut self, index: usize, program: Option<Arc<Program>>) {
        if let Some(slot) = self.programs.get_mut(index) {
            *slot = program;
        } else {
            log::warn!("Program slot {index} out of range (max {MAX_PROGRAMS})");
        }
    }

    #[must_use]
    pub fn program(&self, index: usize) -> Option<&Arc<Program>> {
        self.programs.get(index).and_then(Option::as_ref)
    }

    pub fn set_texture(&mut self, index: usize, texture: Option<Arc<Texture>>) {
        if let Some(slot) = self.textures.get_mut(index) {
            *slot = texture;
        } else {
            log::warn!("Texture slot {index} out of range (max {MAX_TEXTURES})");
        }
    }

    #[must_use]
    pub fn texture(&self, index: usize) -> Option<&Arc<Texture>> {
        self.textures.get(index).and_then(Option::as_ref)
    }

    pub fn set_texture_count(&mut self, count: usize) {
        self.texture_count = count.min(MAX_TEXTURES);
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.texture_count
    }

    pub fn set_fragment_param(&mut self, index: usize, value: Vec4) {
        if index < MAX_FRAGMENT_PARAMS {
            self.fragment_params[index] = value;
            self.fragment_param_count = self.fragment_param_count.max(index + 1);
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[must_use]
    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    #[must_use]
    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    #[must_use]
    pub fn vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_array
    }

    // ========================================================================
    // GPU objects
    // ========================================================================

    /// Uploads a standard-format mesh, replacing any previous buffers.
    pub fn upload_mesh(
        &mut self,
        device: &mut dyn GraphicsDevice,
        vertices: &[Vertex],
        triangles: &[Triangle],
    ) -> Result<()> {
        self.upload_indexed(
            device,
            bytemuck::cast_slice(vertices),
            vertices.len(),
            bytemuck::cast_slice(triangles),
            triangles.len() * 3,
            Vertex::layout,
        )
    }

    /// Uploads raw vertex and index bytes, building the vertex array with `layout`.
    pub fn upload_indexed(
        &mut self,
        device: &mut dyn GraphicsDevice,
        vertex_bytes: &[u8],
        vertex_count: usize,
        index_bytes: &[u8],
        index_count: usize,
        layout: impl FnOnce(BufferHandle) -> VertexLayout,
    ) -> Result<()> {
        let vertex_buffer = device.create_buffer(vertex_bytes.len(), Some(vertex_bytes))?;
        let index_buffer = match device.create_buffer(index_bytes.len(), Some(index_bytes)) {
            Ok(buffer) => buffer,
            Err(err) => {
                device.destroy_buffer(vertex_buffer);
                return Err(err);
            }
        };
        let vertex_array = match device.create_vertex_array(&layout(vertex_buffer)) {
            Ok(array) => array,
            Err(err) => {
                device.destroy_buffer(vertex_buffer);
                device.destroy_buffer(index_buffer);
                return Err(err);
            }
        };

        self.release(device);
        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.vertex_array = Some(vertex_array);
        self.vertex_count = vertex_count as u32;
        self.index_count = index_count as u32;
        Ok(())
    }

    /// Returns exclusively owned buffers and the vertex array to the device.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(array) = self.vertex_array.take() {
            device.destroy_vertex_array(array);
        }
        if let Some(buffer) = self.vertex_buffer.take() {
            device.destroy_buffer(buffer);
        }
        if let Some(buffer) = self.index_buffer.take() {
            device.destroy_buffer(buffer);
        }
        self.vertex_count = 0;
        self.index_count = 0;
    }

    // ========================================================================
    // Draw
    // ========================================================================

    /// Issues one draw with the program in slot `program_index`.
    ///
    /// Returns `false` when the slot holds no program.
    pub fn render(&self, program_index: usize, device: &mut dyn GraphicsDevice) -> bool {
        let Some(program) = self.program(program_index) else {
            log::trace!("Renderable has no program in slot {program_index}, draw skipped");
            return false;
        };

        let textures: SmallVec<[TextureHandle; MAX_TEXTURES]> = self.textures[..self.texture_count]
            .iter()
            .flatten()
            .map(|t| t.handle())
            .collect();

        device.draw(&DrawCall {
            primitive: self.primitive,
            program: program.handle(),
            vertex_array: self.vertex_array,
            index_buffer: self.index_buffer,
            vertex_count: self.vertex_count,
            index_count: self.index_count,
            textures: &textures,
            blend_mode: self.blend_mode,
            flags: self.flags,
            vertex_params: &self.vertex_params[..self.vertex_param_count.min(MAX_VERTEX_PARAMS)],
            vertex_param_location: self.vertex_param_location,
            fragment_params: &self.fragment_params
                [..self.fragment_param_count.min(MAX_FRAGMENT_PARAMS)],
            fragment_param_location: self.fragment_param_location,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::RecordingDevice;
    use glam::Vec2;

    #[test]
    fn shared_program_is_released_on_replace() {
        let mut device = RecordingDevice::new(Vec2::new(640.0, 480.0));
        let program = Program::compile(&mut device, &["vs"], &["fs"]).unwrap();

        let mut a = Renderable::new();
        let mut b = Renderable::new();
        a.set_program(0, Some(program.clone()));
        b.set_program(0, Some(program.clone()));
        assert_eq!(Arc::strong_count(&program), 3);

        a.set_program(0, None);
        assert_eq!(Arc::strong_count(&program), 2);
        drop(b);
        assert_eq!(Arc::strong_count(&program), 1);
    }

    #[test]
    fn render_without_program_is_skipped() {
        let mut device = RecordingDevice::new(Vec2::new(640.0, 480.0));
        let renderable = Renderable::new();
        assert!(!renderable.render(0, &mut device));
        assert!(device.draws().is_empty());
    }

    #[test]
    fn upload_replaces_and_releases_buffers() {
        let mut device = RecordingDevice::new(Vec2::new(640.0, 480.0));
        let mut renderable = Renderable::new();
        let vertices = [Vertex::default(); 3];
        let triangles = [Triangle::new(0, 1, 2)];

        renderable.upload_mesh(&mut device, &vertices, &triangles).unwrap();
        renderable.upload_mesh(&mut device, &vertices, &triangles).unwrap();
        assert_eq!(device.live_buffer_count(), 2);
        assert_eq!(renderable.index_count(), 3);

        renderable.release(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert!(renderable.vertex_buffer().is_none());
    }
}
