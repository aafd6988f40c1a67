use super::*;

fn sample(width: u32, height: u32) -> DepthGrid {
    let values = (0..width * height)
        .map(|i| match i % 4 {
            0 => -(i as f32) * 0.5,
            1 => 0.0,
            2 => 1.0e30,
            _ => i as f32 / 7.0,
        })
        .collect();
    DepthGrid::new(width, height, values).unwrap()
}

fn bits(g: &DepthGrid) -> Vec<u32> {
    g.as_slice().iter().map(|v| v.to_bits()).collect()
}

#[test]
fn tight_round_trip_is_bit_exact() {
    let codec = DepthBufferCodec::default();
    let g = sample(5, 3);
    let buf = codec.to_buffer(&g).unwrap();
    assert_eq!(buf.bytes_per_row(), 20);
    assert_eq!(buf.data().len(), 60);
    assert_eq!(bits(&codec.to_grid(&buf).unwrap()), bits(&g));
}

#[test]
fn degenerate_grids_round_trip() {
    let codec = DepthBufferCodec::with_row_alignment(64).unwrap();
    for (w, h) in [(1, 1), (1, 9), (9, 1)] {
        let g = sample(w, h);
        let back = codec.to_grid(&codec.to_buffer(&g).unwrap()).unwrap();
        assert_eq!((back.width(), back.height()), (w, h));
        assert_eq!(bits(&back), bits(&g));
    }
}

#[test]
fn padded_stride_is_respected_and_zeroed() {
    let codec = DepthBufferCodec::with_row_alignment(16).unwrap();
    let g = sample(3, 4);
    let buf = codec.to_buffer(&g).unwrap();
    assert_eq!(buf.bytes_per_row(), 16);
    for y in 0..4 {
        let row = &buf.data()[y * 16..(y + 1) * 16];
        assert_eq!(&row[12..], &[0, 0, 0, 0]);
    }
    assert_eq!(buf.row_bytes(1).unwrap().len(), 12);
}

#[test]
fn decode_never_reads_padding() {
    let width = 2u32;
    let height = 3u32;
    let stride = 12usize;
    let mut data = vec![0xAB; stride * height as usize];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let v = (y * 10 + x) as f32;
            data[y * stride + x * 4..y * stride + x * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
    }
    let buf = RawDepthBuffer::from_bytes(data, width, height, stride, DepthPixelFormat::DepthFloat32)
        .unwrap();
    let g = DepthBufferCodec::default().to_grid(&buf).unwrap();
    assert_eq!(g.into_rows(), vec![vec![0.0, 1.0], vec![10.0, 11.0], vec![20.0, 21.0]]);
}

#[test]
fn explicit_stride_matches_declared_layout() {
    let codec = DepthBufferCodec::default();
    let g = sample(4, 2);
    let buf = codec.to_buffer_with_stride(&g, 40).unwrap();
    assert_eq!(buf.data().len(), 80);
    assert_eq!(bits(&codec.decode(buf.data(), 4, 2, 40).unwrap()), bits(&g));

    assert!(matches!(
        codec.to_buffer_with_stride(&g, 12),
        Err(RgbdError::Decode(_))
    ));
}

#[test]
fn short_buffers_are_rejected() {
    let err = RawDepthBuffer::from_bytes(vec![0; 31], 2, 4, 8, DepthPixelFormat::DepthFloat32)
        .unwrap_err();
    assert!(matches!(err, RgbdError::Decode(_)));

    let err = DepthBufferCodec::default()
        .decode(&[0; 15], 2, 2, 8)
        .unwrap_err();
    assert!(matches!(err, RgbdError::Decode(_)));
}

#[test]
fn encode_rows_rejects_wrong_lengths() {
    let codec = DepthBufferCodec::default();
    let ok = codec.encode_rows(&[[1.0f32, 2.0], [3.0, 4.0]], 2, 2).unwrap();
    assert_eq!(ok.format(), DepthPixelFormat::DepthFloat32);

    let err = codec
        .encode_rows(&[vec![1.0f32, 2.0], vec![3.0]], 2, 2)
        .unwrap_err();
    assert!(matches!(err, RgbdError::Decode(_)));
    assert!(codec.encode_rows(&[[1.0f32, 2.0]], 2, 2).is_err());
}

#[test]
fn alignment_must_be_power_of_two() {
    assert!(DepthBufferCodec::with_row_alignment(0).is_ok());
    assert!(DepthBufferCodec::with_row_alignment(24).is_err());
    let disp = DepthBufferCodec::default().with_format(DepthPixelFormat::DisparityFloat32);
    let buf = disp.to_buffer(&sample(2, 2)).unwrap();
    assert_eq!(buf.format(), DepthPixelFormat::DisparityFloat32);
}
