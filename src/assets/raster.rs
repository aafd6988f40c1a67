use std::{io::Cursor, path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{RgbdError, RgbdResult};
use crate::foundation::math::mul_div255_u8;

/// Immutable, cheaply clonable raster image.
///
/// Pixels are premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pixels: Arc<image::RgbaImage>,
}

impl RasterImage {
    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> RgbdResult<Self> {
        if width == 0 || height == 0 {
            return Err(RgbdError::validation("image width/height must be non-zero"));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RgbdError::validation(format!(
                "image data length {} does not match {width}x{height}x4 = {expected}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        let pixels = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| RgbdError::validation("image buffer too small for dimensions"))?;
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Convert any decoded image.
    pub fn from_dynamic(img: image::DynamicImage) -> RgbdResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Decode an encoded image (PNG, JPEG, ...) from memory.
    pub fn decode(bytes: &[u8]) -> RgbdResult<Self> {
        let img = image::load_from_memory(bytes).context("decode image from memory")?;
        Self::from_dynamic(img)
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> RgbdResult<Self> {
        let bytes =
            std::fs::read(path).map_err(|e| RgbdError::io(format!("read '{}'", path.display()), e))?;
        Self::decode(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Dimensions as floating-point geometry.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    /// Premultiplied RGBA8 pixels.
    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    /// Encode as PNG (straight alpha), e.g. for handing to a media library.
    pub fn encode_png(&self) -> RgbdResult<Vec<u8>> {
        let mut straight = self.pixels.as_raw().clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width(), self.height(), straight)
            .ok_or_else(|| RgbdError::validation("image buffer too small for dimensions"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
