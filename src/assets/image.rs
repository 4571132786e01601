use std::path::Path;
use std::sync::Arc;

use crate::errors::{Result, UmbraError};
use crate::render::device::{GraphicsDevice, Texture, TextureDescriptor, TextureFormat};

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 texels.
    pub pixels: Vec<u8>,
}

impl Image {
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// RGBA texel at `(x, y)`.
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Uploads the image as a single-level 2D texture.
    pub fn create_texture(&self, device: &mut dyn GraphicsDevice, format: TextureFormat) -> Result<Arc<Texture>> {
        Texture::create(device, TextureDescriptor::d2(format, self.width, self.height), &self.pixels)
    }
}

/// Loads and decodes an image file (PNG or JPEG).
pub fn load_image(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UmbraError::AssetNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    decode_image(&bytes, &path.display().to_string())
}

/// Decodes an in-memory image; `label` only appears in errors.
pub fn decode_image(bytes: &[u8], label: &str) -> Result<Image> {
    let img = ::image::load_from_memory(bytes)
        .map_err(|e| UmbraError::ImageDecodeError(format!("Failed to decode image {label}: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded image {label}: {width}x{height}");
    Ok(Image::new(width, height, rgba.into_raw()))
}
