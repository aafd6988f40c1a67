use crate::foundation::core::{Rect, Size};

/// Where a source image lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Destination rectangle in canvas pixels.
    pub rect: Rect,
}

/// Aspect-fit `image` into `canvas`: uniform scale, no cropping, centered.
///
/// `scale = min(W/w, H/h)`; offsets are `(W - w*scale)/2` and `(H - h*scale)/2`, clamped to 0.
/// An image that already has the canvas aspect ratio lands at the origin.
pub fn aspect_fit(image: Size, canvas: Size) -> Placement {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Placement {
            scale: 0.0,
            rect: Rect::ZERO,
        };
    }

    let scale = (canvas.width / image.width).min(canvas.height / image.height);
    let fitted = Size::new(image.width * scale, image.height * scale);

    let x = ((canvas.width - fitted.width) / 2.0).max(0.0);
    let y = ((canvas.height - fitted.height) / 2.0).max(0.0);

    Placement {
        scale,
        rect: Rect::from_origin_size((x, y), fitted),
    }
}

/// Integer pixel rectangle `[x0, x1) x [y0, y1)` inside a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub(crate) x0: u32,
    pub(crate) y0: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl PixelRect {
    /// Snap a placement to whole pixels, keeping at least one pixel per axis and staying inside
    /// the canvas.
    pub(crate) fn snap(rect: Rect, canvas_w: u32, canvas_h: u32) -> Option<Self> {
        if canvas_w == 0 || canvas_h == 0 {
            return None;
        }
        let (x0, width) = snap_axis(rect.x0, rect.x1, canvas_w);
        let (y0, height) = snap_axis(rect.y0, rect.y1, canvas_h);
        Some(Self {
            x0,
            y0,
            width,
            height,
        })
    }
}

fn snap_axis(lo: f64, hi: f64, extent: u32) -> (u32, u32) {
    let start = (lo.round().max(0.0) as u32).min(extent - 1);
    let end = (hi.round().max(0.0) as u32).clamp(start + 1, extent);
    (start, end - start)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/placement.rs"]
mod tests;
