use super::*;
use crate::encode::pool::{BufferDesc, PixelBufferPool, PoolOpts};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    RasterImage::from_rgba8(width, height, data).unwrap()
}

fn pixel(buf: &PixelBuffer, x: usize, y: usize) -> [u8; 4] {
    let row = buf.row(y);
    [row[x * 4], row[x * 4 + 1], row[x * 4 + 2], row[x * 4 + 3]]
}

fn canvas_pool(width: u32, height: u32) -> PixelBufferPool {
    PixelBufferPool::new(width, height, PixelFormat::Rgba8Premul, PoolOpts::default()).unwrap()
}

#[test]
fn matching_aspect_covers_whole_canvas() {
    let canvas = Canvas {
        width: 8,
        height: 4,
    };
    let c = FrameCompositor::new(canvas, ResizeFilter::Nearest);
    let pool = canvas_pool(8, 4);
    let mut buf = pool.acquire().unwrap();

    let placement = c.compose(&solid(4, 2, [10, 20, 30, 255]), &mut buf).unwrap();
    assert_eq!(placement.rect.origin(), crate::foundation::core::Point::ZERO);
    for y in 0..4 {
        for x in 0..8 {
            assert_eq!(pixel(&buf, x, y), [10, 20, 30, 255]);
        }
    }
}

#[test]
fn wide_image_leaves_cleared_bars() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let c = FrameCompositor::new(canvas, ResizeFilter::Nearest);
    let pool = canvas_pool(4, 4);
    let mut buf = pool.acquire().unwrap();
    buf.data_mut().fill(0xAB);

    c.compose(&solid(4, 2, [255, 0, 0, 255]), &mut buf).unwrap();
    for x in 0..4 {
        assert_eq!(pixel(&buf, x, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&buf, x, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&buf, x, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&buf, x, 3), [0, 0, 0, 0]);
    }
    // Row padding is cleared too.
    assert!(buf.row(0)[16..].iter().all(|&v| v == 0));
}

#[test]
fn same_size_image_is_copied_verbatim() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let img = RasterImage::from_rgba8(
        2,
        2,
        vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255, 10, 11, 12, 255],
    )
    .unwrap();
    let c = FrameCompositor::new(canvas, ResizeFilter::Lanczos3);
    let mut buf = PixelBuffer::standalone(BufferDesc::new(2, 2, PixelFormat::Rgba8Premul, 64));
    c.compose(&img, &mut buf).unwrap();
    assert_eq!(buf.to_tight_vec(), img.pixels().as_raw().clone());
}

#[test]
fn mismatched_buffer_cannot_host_draw_context() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let c = FrameCompositor::new(canvas, ResizeFilter::Triangle);
    let mut buf = PixelBuffer::standalone(BufferDesc::new(2, 2, PixelFormat::Rgba8Premul, 1));
    let err = c
        .compose(&solid(1, 1, [0, 0, 0, 255]), &mut buf)
        .unwrap_err();
    assert!(err.to_string().contains("draw context"));
}

#[test]
fn resize_filter_parses_snake_case() {
    let f: ResizeFilter = serde_json::from_str("\"catmull_rom\"").unwrap();
    assert_eq!(f, ResizeFilter::CatmullRom);
    assert_eq!(ResizeFilter::default(), ResizeFilter::Triangle);
}
