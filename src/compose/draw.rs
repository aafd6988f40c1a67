use image::imageops::FilterType;

use crate::assets::raster::RasterImage;
use crate::compose::placement::{PixelRect, Placement, aspect_fit};
use crate::encode::pool::{PixelBuffer, PixelFormat};
use crate::foundation::core::Canvas;
use crate::foundation::error::{RgbdError, RgbdResult};

/// Resampling filter used when scaling sources onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Catmull-Rom bicubic.
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl ResizeFilter {
    fn to_image(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Draws one source image per frame onto a cleared canvas-sized buffer.
#[derive(Clone, Copy, Debug)]
pub struct FrameCompositor {
    canvas: Canvas,
    filter: ResizeFilter,
}

impl FrameCompositor {
    /// Compositor for `canvas` using `filter` for resampling.
    pub fn new(canvas: Canvas, filter: ResizeFilter) -> Self {
        Self { canvas, filter }
    }

    /// Target canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Clear `target` to transparent black and draw `image` aspect-fit and centered.
    ///
    /// Fails when `target` cannot host a draw context for this canvas.
    pub fn compose(&self, image: &RasterImage, target: &mut PixelBuffer) -> RgbdResult<Placement> {
        self.check_target(target)?;

        target.data_mut().fill(0);

        let placement = aspect_fit(image.size(), self.canvas.size());
        let Some(px) = PixelRect::snap(placement.rect, self.canvas.width, self.canvas.height)
        else {
            return Ok(placement);
        };

        let scaled;
        let src = if px.width == image.width() && px.height == image.height() {
            image.pixels()
        } else {
            scaled = image::imageops::resize(
                image.pixels(),
                px.width,
                px.height,
                self.filter.to_image(),
            );
            &scaled
        };

        let bpp = PixelFormat::Rgba8Premul.bytes_per_pixel();
        let src_row_bytes = px.width as usize * bpp;
        let dst_x = px.x0 as usize * bpp;
        for (row, src_row) in src.as_raw().chunks_exact(src_row_bytes).enumerate() {
            let dst_row = target.row_mut(px.y0 as usize + row);
            dst_row[dst_x..dst_x + src_row_bytes].copy_from_slice(src_row);
        }

        tracing::trace!(
            x = px.x0,
            y = px.y0,
            w = px.width,
            h = px.height,
            "composited frame"
        );
        Ok(placement)
    }

    fn check_target(&self, target: &PixelBuffer) -> RgbdResult<()> {
        let desc = target.desc();
        if desc.width != self.canvas.width || desc.height != self.canvas.height {
            return Err(RgbdError::allocation(format!(
                "cannot create draw context: buffer is {}x{}, canvas is {}x{}",
                desc.width, desc.height, self.canvas.width, self.canvas.height
            )));
        }
        if desc.format != PixelFormat::Rgba8Premul
            || desc.bytes_per_row < desc.tight_row_bytes()
            || target.data().len() < desc.byte_len()
        {
            return Err(RgbdError::allocation(
                "cannot create draw context: buffer layout does not fit its dimensions",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/draw.rs"]
mod tests;
