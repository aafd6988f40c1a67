use super::*;

fn pool(capacity: usize) -> PixelBufferPool {
    PixelBufferPool::new(
        10,
        3,
        PixelFormat::Rgba8Premul,
        PoolOpts {
            capacity,
            row_alignment: 16,
        },
    )
    .unwrap()
}

#[test]
fn desc_pads_rows_to_alignment() {
    let p = pool(1);
    let d = p.desc();
    assert_eq!(d.tight_row_bytes(), 40);
    assert_eq!(d.bytes_per_row, 48);
    assert_eq!(d.byte_len(), 48 * 3);
}

#[test]
fn pool_refuses_beyond_capacity_and_recovers_on_release() {
    let p = pool(2);
    let a = p.acquire().unwrap();
    let b = p.acquire().unwrap();
    let err = p.acquire().unwrap_err();
    assert!(matches!(err, RgbdError::Allocation(_)));
    assert_eq!(p.stats().exhausted, 1);
    assert_eq!(p.stats().outstanding, 2);

    drop(a);
    let c = p.acquire().unwrap();
    let st = p.stats();
    assert_eq!(st.allocated, 2);
    assert_eq!(st.reused, 1);
    assert_eq!(st.outstanding, 2);
    drop((b, c));
    assert_eq!(p.stats().outstanding, 0);
    assert_eq!(p.stats().retained, 2);
}

#[test]
fn recycled_storage_is_reused_not_reallocated() {
    let p = pool(1);
    let mut a = p.acquire().unwrap();
    a.data_mut().fill(7);
    drop(a);
    let b = p.acquire().unwrap();
    assert!(b.data().iter().all(|&v| v == 7));
    assert_eq!(p.stats().allocated, 1);
}

#[test]
fn pool_rejects_bad_options() {
    let opts = PoolOpts {
        capacity: 0,
        row_alignment: 1,
    };
    assert!(PixelBufferPool::new(4, 4, PixelFormat::Rgba8Premul, opts).is_err());
    let opts = PoolOpts {
        capacity: 1,
        row_alignment: 24,
    };
    assert!(PixelBufferPool::new(4, 4, PixelFormat::Rgba8Premul, opts).is_err());
    assert!(PixelBufferPool::new(0, 4, PixelFormat::Rgba8Premul, PoolOpts::default()).is_err());
}

#[test]
fn from_image_respects_stride_and_tight_copy_strips_padding() {
    let rgba: Vec<u8> = (0..2 * 2 * 4).map(|v| v as u8).collect();
    let img = RasterImage::from_rgba8(
        2,
        2,
        rgba.iter()
            .enumerate()
            .map(|(i, &v)| if i % 4 == 3 { 255 } else { v })
            .collect(),
    )
    .unwrap();
    let buf = PixelBuffer::from_image(&img, 64);
    assert_eq!(buf.bytes_per_row(), 64);
    assert_eq!(buf.data().len(), 128);
    assert!(buf.row(0)[8..].iter().all(|&v| v == 0));
    assert_eq!(buf.to_tight_vec(), img.pixels().as_raw().clone());
}

#[test]
fn buffers_outlive_pool_handle() {
    let p = pool(1);
    let a = p.acquire().unwrap();
    drop(p);
    assert_eq!(a.width(), 10);
    drop(a);
}
