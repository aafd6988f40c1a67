use std::collections::HashMap;
use std::sync::Arc;

use crate::depth::buffer::RawDepthBuffer;
use crate::encode::pool::PixelBuffer;

/// GPU-style texture formats the cache can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA.
    Rgba8Unorm,
    /// One 32-bit float channel.
    R32Float,
}

impl TextureFormat {
    /// Bytes per texel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::R32Float => 4,
        }
    }
}

/// Strided pixel memory that can be uploaded as a texture.
pub trait PixelSource {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Bytes between the starts of consecutive rows.
    fn bytes_per_row(&self) -> usize;
    /// Texture format the pixel layout corresponds to.
    fn texture_format(&self) -> TextureFormat;
    /// Raw bytes, including row padding.
    fn bytes(&self) -> &[u8];
}

impl PixelSource for PixelBuffer {
    fn width(&self) -> u32 {
        PixelBuffer::width(self)
    }

    fn height(&self) -> u32 {
        PixelBuffer::height(self)
    }

    fn bytes_per_row(&self) -> usize {
        PixelBuffer::bytes_per_row(self)
    }

    fn texture_format(&self) -> TextureFormat {
        TextureFormat::Rgba8Unorm
    }

    fn bytes(&self) -> &[u8] {
        self.data()
    }
}

impl PixelSource for RawDepthBuffer {
    fn width(&self) -> u32 {
        RawDepthBuffer::width(self)
    }

    fn height(&self) -> u32 {
        RawDepthBuffer::height(self)
    }

    fn bytes_per_row(&self) -> usize {
        RawDepthBuffer::bytes_per_row(self)
    }

    fn texture_format(&self) -> TextureFormat {
        TextureFormat::R32Float
    }

    fn bytes(&self) -> &[u8] {
        self.data()
    }
}

/// Tightly packed, immutable texture handle.
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Arc<Vec<u8>>,
}

impl Texture {
    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Texel bytes, rows tightly packed.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

type TextureKey = (u32, u32, TextureFormat);

/// Texture cache owned by whoever displays frames.
///
/// Backing storage is reused per `(width, height, format)` once every handle to it is dropped.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<TextureKey, Vec<Arc<Vec<u8>>>>,
}

impl TextureCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `source` into a texture of `format`.
    ///
    /// Returns `None` (after logging and flushing the cache) when the source cannot be shown in
    /// `format` or its bytes do not cover its declared geometry.
    pub fn create_texture(
        &mut self,
        source: &dyn PixelSource,
        format: TextureFormat,
    ) -> Option<Texture> {
        let (width, height) = (source.width(), source.height());
        if source.texture_format() != format {
            tracing::warn!(
                requested = ?format,
                source = ?source.texture_format(),
                "texture creation failed: pixel format mismatch"
            );
            self.flush();
            return None;
        }
        let tight = width as usize * format.bytes_per_pixel();
        let stride = source.bytes_per_row();
        let needed = stride.checked_mul(height as usize);
        if stride < tight || needed.is_none_or(|n| source.bytes().len() < n) {
            tracing::warn!(
                width,
                height,
                stride,
                len = source.bytes().len(),
                "texture creation failed: source shorter than its geometry"
            );
            self.flush();
            return None;
        }

        let mut storage = self.recycle((width, height, format));
        {
            let buf = Arc::make_mut(&mut storage);
            buf.clear();
            for y in 0..height as usize {
                let start = y * stride;
                buf.extend_from_slice(&source.bytes()[start..start + tight]);
            }
        }
        self.entries
            .entry((width, height, format))
            .or_default()
            .push(Arc::clone(&storage));

        Some(Texture {
            width,
            height,
            format,
            data: storage,
        })
    }

    /// Take a free backing allocation for `key`, or a fresh one.
    fn recycle(&mut self, key: TextureKey) -> Arc<Vec<u8>> {
        if let Some(list) = self.entries.get_mut(&key)
            && let Some(pos) = list.iter().position(|a| Arc::strong_count(a) == 1)
        {
            return list.swap_remove(pos);
        }
        Arc::new(Vec::new())
    }

    /// Drop every cached allocation.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    /// Number of tracked allocations.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/texture.rs"]
mod tests;
