//! Texture assets and raw pixel data.

use super::AssetPath;
use crate::error::{ExporterError, Result};
use image::{ImageEncoder, RgbaImage};

/// Byte length of an RGBA8 buffer.
fn pixel_bytes(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Raw RGBA8 pixel data for one mip level.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a texture filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(pixel_bytes(width, height))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Check that the pixel buffer matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == pixel_bytes(self.width, self.height)
    }

    /// Resample to new dimensions.
    pub fn resized(&self, width: u32, height: u32) -> Result<TextureData> {
        if self.width == width && self.height == height {
            return Ok(self.clone());
        }
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            ExporterError::Export(format!(
                "pixel buffer does not match {}x{} texture",
                self.width, self.height
            ))
        })?;
        let resized = image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle);
        Ok(TextureData::new(width, height, resized.into_raw()))
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        if !self.is_valid() {
            return Err(ExporterError::Export(format!(
                "cannot encode {}x{} texture from {} bytes",
                self.width,
                self.height,
                self.pixels.len()
            )));
        }

        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder
            .write_image(&self.pixels, self.width, self.height, image::ExtendedColorType::Rgba8)
            .map_err(|e| ExporterError::Export(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }
}

/// Load a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> std::result::Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData::new(width, height, rgba.into_raw()))
}

/// A 2D texture asset with its mip chain. Mip 0 is the top (largest) mip.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub path: AssetPath,
    pub mips: Vec<TextureData>,
}

impl Texture {
    pub fn new(path: impl Into<AssetPath>, top_mip: TextureData) -> Self {
        Self {
            path: path.into(),
            mips: vec![top_mip],
        }
    }

    /// The top mip, if present and well formed.
    pub fn top_mip(&self) -> Option<&TextureData> {
        self.mips.first().filter(|mip| mip.is_valid())
    }
}
