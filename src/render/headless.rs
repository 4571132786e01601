//! Headless graphics collaborator.
//!
//! [`RecordingDevice`] keeps every resource in CPU memory and records each
//! draw and parameter upload, so frame orchestration can be inspected
//! without a GPU.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use slotmap::SlotMap;

use crate::errors::{Result, UmbraError};
use crate::render::device::{
    BufferHandle, DrawCall, GraphicsDevice, ProgramHandle, ReleaseQueue, TextureDescriptor,
    TextureHandle, VertexArrayHandle, VertexLayout,
};
use crate::render::params::UniversalParams;
use crate::render::renderable::{BlendMode, RenderFlags};

/// Snapshot of one submitted draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: ProgramHandle,
    pub vertex_array: Option<VertexArrayHandle>,
    pub index_count: u32,
    pub textures: Vec<TextureHandle>,
    pub blend_mode: BlendMode,
    pub flags: RenderFlags,
    pub vertex_params: Vec<Vec4>,
    pub fragment_params: Vec<Vec4>,
    /// Index into [`RecordingDevice::param_uploads`] of the block active for this draw.
    pub params_revision: Option<usize>,
}

#[derive(Debug, Clone)]
struct ProgramSource {
    vertex: String,
    fragment: String,
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    viewport: Vec2,
    buffers: SlotMap<BufferHandle, Vec<u8>>,
    vertex_arrays: SlotMap<VertexArrayHandle, VertexLayout>,
    programs: SlotMap<ProgramHandle, ProgramSource>,
    textures: SlotMap<TextureHandle, (TextureDescriptor, Vec<u8>)>,
    releases: Arc<ReleaseQueue>,
    draws: Vec<DrawRecord>,
    param_uploads: Vec<UniversalParams>,
}

impl RecordingDevice {
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn set_viewport_size(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    #[must_use]
    pub fn param_uploads(&self) -> &[UniversalParams] {
        &self.param_uploads
    }

    /// Forgets recorded draws and parameter uploads, keeping resources alive.
    pub fn clear_frame(&mut self) {
        self.draws.clear();
        self.param_uploads.clear();
    }

    #[must_use]
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(buffer).map(Vec::as_slice)
    }

    #[must_use]
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn live_vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    #[must_use]
    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn vertex_layout(&self, vertex_array: VertexArrayHandle) -> Option<&VertexLayout> {
        self.vertex_arrays.get(vertex_array)
    }

    /// Concatenated vertex and fragment sources of a program.
    #[must_use]
    pub fn program_source(&self, program: ProgramHandle) -> Option<(&str, &str)> {
        self.programs
            .get(program)
            .map(|p| (p.vertex.as_str(), p.fragment.as_str()))
    }

    #[must_use]
    pub fn texture_data(&self, texture: TextureHandle) -> Option<(&TextureDescriptor, &[u8])> {
        self.textures.get(texture).map(|(d, data)| (d, data.as_slice()))
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self, size: usize, data: Option<&[u8]>) -> Result<BufferHandle> {
        let mut storage = vec![0u8; size];
        if let Some(data) = data {
            if data.len() > size {
                return Err(UmbraError::Graphics(format!(
                    "initial data of {} bytes exceeds buffer size {size}",
                    data.len()
                )));
            }
            storage[..data.len()].copy_from_slice(data);
        }
        Ok(self.buffers.insert(storage))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        let storage = self
            .buffers
            .get_mut(buffer)
            .ok_or_else(|| UmbraError::Graphics(format!("write to stale buffer {buffer:?}")))?;
        let end = offset + data.len();
        if end > storage.len() {
            return Err(UmbraError::Graphics(format!(
                "write of {} bytes at {offset} overruns buffer of {} bytes",
                data.len(),
                storage.len()
            )));
        }
        storage[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(buffer);
    }

    fn create_vertex_array(&mut self, layout: &VertexLayout) -> Result<VertexArrayHandle> {
        if !self.buffers.contains_key(layout.buffer) {
            return Err(UmbraError::Graphics(
                "vertex array references a stale buffer".to_string(),
            ));
        }
        Ok(self.vertex_arrays.insert(layout.clone()))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(vertex_array);
    }

    fn create_program(
        &mut self,
        vertex_sources: &[&str],
        fragment_sources: &[&str],
    ) -> Result<ProgramHandle> {
        if vertex_sources.is_empty() || fragment_sources.is_empty() {
            return Err(UmbraError::Graphics(
                "program requires vertex and fragment sources".to_string(),
            ));
        }
        Ok(self.programs.insert(ProgramSource {
            vertex: vertex_sources.concat(),
            fragment: fragment_sources.concat(),
        }))
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.programs.remove(program);
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureHandle> {
        let expected = descriptor.base_level_size();
        if !data.is_empty() && data.len() != expected {
            return Err(UmbraError::Graphics(format!(
                "texture data is {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(self.textures.insert((*descriptor, data.to_vec())))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(texture);
    }

    fn release_queue(&self) -> Arc<ReleaseQueue> {
        Arc::clone(&self.releases)
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    fn update_universal_params(&mut self, params: &UniversalParams) {
        self.param_uploads.push(*params);
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.draws.push(DrawRecord {
            program: call.program,
            vertex_array: call.vertex_array,
            index_count: call.index_count,
            textures: call.textures.to_vec(),
            blend_mode: call.blend_mode,
            flags: call.flags,
            vertex_params: call.vertex_params.to_vec(),
            fragment_params: call.fragment_params.to_vec(),
            params_revision: self.param_uploads.len().checked_sub(1),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::Program;

    #[test]
    fn write_buffer_bounds_are_checked() {
        let mut device = RecordingDevice::new(Vec2::ONE);
        let buffer = device.create_buffer(4, Some(&[1, 2])).unwrap();
        assert_eq!(device.buffer_data(buffer), Some(&[1, 2, 0, 0][..]));

        device.write_buffer(buffer, 2, &[7, 8]).unwrap();
        assert_eq!(device.buffer_data(buffer), Some(&[1, 2, 7, 8][..]));
        assert!(device.write_buffer(buffer, 3, &[9, 9]).is_err());

        device.destroy_buffer(buffer);
        assert!(device.write_buffer(buffer, 0, &[0]).is_err());
    }

    #[test]
    fn released_program_waits_for_collection() {
        let mut device = RecordingDevice::new(Vec2::ONE);
        let program = Program::compile(&mut device, &["vs"], &["fs"]).unwrap();
        drop(program);
        assert_eq!(device.live_program_count(), 1);
        assert_eq!(device.releases.len(), 1);

        device.collect_released();
        assert_eq!(device.live_program_count(), 0);
        assert!(device.releases.is_empty());
    }
}
