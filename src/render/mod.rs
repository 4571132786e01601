//! Rendering Collaborator Boundary
//!
//! The core never talks to a GPU API directly. It describes work through:
//! - [`GraphicsDevice`]: the graphics-resource collaborator (buffers,
//!   vertex arrays, programs, textures, draw submission)
//! - [`Renderable`]: per-geometry render state and draw issuing
//! - [`UniversalParams`]: the per-frame parameter block
//! - [`Vertex`] / [`Triangle`]: the standard mesh formats
//!
//! [`RecordingDevice`] is a headless collaborator that records everything it
//! is asked to do, used by tests and tools.

pub mod device;
pub mod headless;
pub mod params;
pub mod renderable;
pub mod vertex;

pub use device::{
    AttributeFormat, BufferHandle, DrawCall, GraphicsDevice, Program, ProgramHandle, ReleaseQueue,
    ReleasedResource, Texture, TextureDescriptor, TextureFormat, TextureHandle, TextureKind,
    VertexArrayHandle, VertexAttribute, VertexLayout,
};
pub use headless::{DrawRecord, RecordingDevice};
pub use params::UniversalParams;
pub use renderable::{BlendMode, PrimitiveType, RenderFlags, Renderable};
pub use vertex::{Triangle, Vertex};

/// Program slot used by the ambient pass.
pub const AMBIENT_PROGRAM: usize = 0;
/// Program slot used by each additive light pass.
pub const LIGHT_PROGRAM: usize = 1;
