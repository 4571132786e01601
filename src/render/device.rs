//! Graphics Collaborator
//!
//! [`GraphicsDevice`] is the only path by which the core touches GPU state.
//! Resources are referred to by generational handles; a handle that outlived
//! its resource is rejected rather than aliasing a newer one.
//!
//! Programs and textures may be shared by many renderables. They are wrapped
//! in [`Arc`] so sharing is reference counted: a renderable retains on
//! assignment and releases on replacement or drop. When the last owner lets
//! go, the handle moves to the device's [`ReleaseQueue`] and the GPU object
//! is destroyed at the next [`GraphicsDevice::collect_released`].

use std::sync::{Arc, Mutex, PoisonError};

use glam::{Vec2, Vec4};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::render::params::UniversalParams;
use crate::render::renderable::{BlendMode, PrimitiveType, RenderFlags};

new_key_type! {
    /// Handle of a GPU buffer (vertex, index or uniform data).
    pub struct BufferHandle;
    /// Handle of a vertex array describing attribute layout.
    pub struct VertexArrayHandle;
    /// Handle of a linked shader program.
    pub struct ProgramHandle;
    /// Handle of a texture object.
    pub struct TextureHandle;
}

// ============================================================================
// Vertex Layout
// ============================================================================

/// Component format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float32,
    Uint8Normalized,
}

/// One attribute of a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub format: AttributeFormat,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

/// Attribute layout over a single vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub buffer: BufferHandle,
    pub stride: u32,
    pub attributes: SmallVec<[VertexAttribute; 5]>,
}

// ============================================================================
// Textures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    D2,
    D3,
    Cube,
    D2Array,
    Rectangle,
    Multisample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    GammaRgba,
    LinearRgba,
    SignedRgba,
    LinearRedGreen,
    SignedRedGreen,
    LinearRed,
    SignedRed,
    Float16Rgba,
    Uint16Rgba,
    Depth,
}

impl TextureFormat {
    /// Size in bytes of one texel.
    #[must_use]
    pub fn bytes_per_texel(self) -> usize {
        match self {
            Self::GammaRgba | Self::LinearRgba | Self::SignedRgba | Self::Depth => 4,
            Self::LinearRedGreen | Self::SignedRedGreen => 2,
            Self::LinearRed | Self::SignedRed => 1,
            Self::Float16Rgba | Self::Uint16Rgba => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
}

impl TextureDescriptor {
    /// A single-level 2D texture.
    #[must_use]
    pub fn d2(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            kind: TextureKind::D2,
            format,
            width,
            height,
            depth: 1,
            mip_levels: 1,
        }
    }

    /// Bytes expected for the base level.
    #[must_use]
    pub fn base_level_size(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize * self.format.bytes_per_texel()
    }
}

// ============================================================================
// Shared GPU objects
// ============================================================================

/// A shared GPU object whose last owner has dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasedResource {
    Program(ProgramHandle),
    Texture(TextureHandle),
}

/// Handles waiting to be destroyed by the device that created them.
#[derive(Debug, Default)]
pub struct ReleaseQueue {
    pending: Mutex<Vec<ReleasedResource>>,
}

impl ReleaseQueue {
    fn push(&self, resource: ReleasedResource) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(resource);
    }

    /// Takes every pending handle.
    pub fn drain(&self) -> Vec<ReleasedResource> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A linked program. Shared between renderables through `Arc<Program>`.
#[derive(Debug)]
pub struct Program {
    handle: ProgramHandle,
    releases: Arc<ReleaseQueue>,
}

impl Program {
    /// Links a program from ordered vertex and fragment source fragments.
    pub fn compile(
        device: &mut dyn GraphicsDevice,
        vertex_sources: &[&str],
        fragment_sources: &[&str],
    ) -> Result<Arc<Self>> {
        let handle = device.create_program(vertex_sources, fragment_sources)?;
        Ok(Arc::new(Self {
            handle,
            releases: device.release_queue(),
        }))
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.releases.push(ReleasedResource::Program(self.handle));
    }
}

/// A texture object. Shared between renderables through `Arc<Texture>`.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    descriptor: TextureDescriptor,
    releases: Arc<ReleaseQueue>,
}

impl Texture {
    /// Creates a texture and uploads its base level.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        descriptor: TextureDescriptor,
        data: &[u8],
    ) -> Result<Arc<Self>> {
        let handle = device.create_texture(&descriptor, data)?;
        Ok(Arc::new(Self {
            handle,
            descriptor,
            releases: device.release_queue(),
        }))
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.releases.push(ReleasedResource::Texture(self.handle));
    }
}

// ============================================================================
// Draw submission
// ============================================================================

/// Everything the collaborator needs to issue one draw.
#[derive(Debug, Clone)]
pub struct DrawCall<'a> {
    pub primitive: PrimitiveType,
    pub program: ProgramHandle,
    pub vertex_array: Option<VertexArrayHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub textures: &'a [TextureHandle],
    pub blend_mode: BlendMode,
    pub flags: RenderFlags,
    pub vertex_params: &'a [Vec4],
    pub vertex_param_location: u32,
    pub fragment_params: &'a [Vec4],
    pub fragment_param_location: u32,
}

/// The graphics-resource collaborator.
///
/// Creation failures surface as [`UmbraError::Graphics`](crate::UmbraError::Graphics).
/// Releasing a stale handle is a no-op.
pub trait GraphicsDevice {
    /// Allocates a buffer of `size` bytes, optionally initialized with `data`.
    fn create_buffer(&mut self, size: usize, data: Option<&[u8]>) -> Result<BufferHandle>;

    /// Overwrites `data.len()` bytes of the buffer starting at `offset`.
    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    fn create_vertex_array(&mut self, layout: &VertexLayout) -> Result<VertexArrayHandle>;

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Links a program from ordered source fragments for each stage.
    fn create_program(
        &mut self,
        vertex_sources: &[&str],
        fragment_sources: &[&str],
    ) -> Result<ProgramHandle>;

    fn destroy_program(&mut self, program: ProgramHandle);

    fn create_texture(&mut self, descriptor: &TextureDescriptor, data: &[u8])
    -> Result<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Queue that shared programs and textures created on this device
    /// report to when their last owner drops.
    fn release_queue(&self) -> Arc<ReleaseQueue>;

    /// Destroys every program and texture whose last owner has dropped.
    fn collect_released(&mut self) {
        for resource in self.release_queue().drain() {
            match resource {
                ReleasedResource::Program(program) => self.destroy_program(program),
                ReleasedResource::Texture(texture) => self.destroy_texture(texture),
            }
        }
    }

    /// Current viewport size in pixels.
    fn viewport_size(&self) -> Vec2;

    /// Publishes the per-frame parameter block to all programs.
    fn update_universal_params(&mut self, params: &UniversalParams);

    fn draw(&mut self, call: &DrawCall<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_base_level_size() {
        let desc = TextureDescriptor::d2(TextureFormat::SignedRedGreen, 16, 8);
        assert_eq!(desc.base_level_size(), 16 * 8 * 2);
        let desc = TextureDescriptor::d2(TextureFormat::Float16Rgba, 4, 4);
        assert_eq!(desc.base_level_size(), 4 * 4 * 8);
    }
}
