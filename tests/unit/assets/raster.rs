use super::*;

fn png_bytes(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, vec![100, 50, 200, 128]);
    let img = RasterImage::decode(&buf).unwrap();
    assert_eq!(img.width(), 1);
    assert_eq!(img.height(), 1);
    assert_eq!(
        img.pixels().as_raw().as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn from_rgba8_rejects_bad_geometry() {
    assert!(RasterImage::from_rgba8(0, 4, Vec::new()).is_err());
    assert!(RasterImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(RasterImage::from_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn decode_garbage_fails() {
    assert!(RasterImage::decode(b"not an image").is_err());
}

#[test]
fn encode_png_roundtrips_opaque_pixels() {
    let rgba = vec![
        255, 0, 0, 255, 0, 255, 0, 255, //
        0, 0, 255, 255, 9, 8, 7, 255,
    ];
    let img = RasterImage::from_rgba8(2, 2, rgba.clone()).unwrap();
    let png = img.encode_png().unwrap();
    assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);

    let back = RasterImage::decode(&png).unwrap();
    assert_eq!(back.pixels().as_raw(), &rgba);
}

#[test]
fn clones_share_pixels() {
    let img = RasterImage::from_rgba8(1, 1, vec![1, 2, 3, 255]).unwrap();
    let other = img.clone();
    assert!(std::ptr::eq(img.pixels(), other.pixels()));
}
