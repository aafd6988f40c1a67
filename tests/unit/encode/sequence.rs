use super::*;

fn solid(width: u32, height: u32) -> RasterImage {
    RasterImage::from_rgba8(width, height, vec![200; (width * height * 4) as usize]).unwrap()
}

#[test]
fn cursor_walks_images_in_order() {
    let images: Arc<[RasterImage]> = vec![solid(1, 1), solid(2, 1), solid(3, 1)].into();
    let mut cursor = FrameCursor::new(images);
    assert_eq!(cursor.remaining(), 3);

    let mut widths = Vec::new();
    while let Some((idx, img)) = cursor.next_frame() {
        assert_eq!(idx.0 as u32 + 1, img.width());
        widths.push(img.width());
    }
    assert_eq!(widths, vec![1, 2, 3]);
    assert_eq!(cursor.remaining(), 0);
    assert!(cursor.next_frame().is_none());
}

#[test]
fn cache_destination_uses_fixed_file_name() {
    let p = OutputDestination::CacheDir.resolve();
    assert_eq!(p.file_name().unwrap(), DEFAULT_OUTPUT_FILE_NAME);

    let explicit = PathBuf::from("/tmp/somewhere/clip.mp4");
    assert_eq!(OutputDestination::Path(explicit.clone()).resolve(), explicit);
}

#[test]
fn existing_output_is_removed_and_missing_output_is_fine() {
    let dir = std::env::temp_dir().join(format!("rgbd_seq_unit_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("old.mp4");
    std::fs::write(&path, b"stale").unwrap();

    remove_existing_output(&path).unwrap();
    assert!(!path.exists());
    remove_existing_output(&path).unwrap();

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unremovable_output_is_an_io_error() {
    let dir = std::env::temp_dir().join(format!("rgbd_seq_unit_dir_{}", std::process::id()));
    let blocker = dir.join("OutputVideo.mp4");
    std::fs::create_dir_all(&blocker).unwrap();

    let err = remove_existing_output(&blocker).unwrap_err();
    assert!(matches!(err, RgbdError::Io { .. }));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn encode_outside_runtime_is_a_configuration_error() {
    let enc = FrameSequenceEncoder::default();
    let err = enc
        .encode(
            vec![solid(2, 2)],
            &OutputDestination::Path(std::env::temp_dir().join("rgbd_no_runtime.mp4")),
            crate::encode::writer::InMemoryWriter::new(),
        )
        .unwrap_err();
    assert!(matches!(err, RgbdError::Configuration(_)));
}

#[tokio::test]
async fn empty_input_fails_before_touching_the_output() {
    let dir = std::env::temp_dir().join(format!("rgbd_seq_unit_empty_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("keep.mp4");
    std::fs::write(&path, b"previous").unwrap();

    let writer = crate::encode::writer::InMemoryWriter::new();
    let rec = writer.recording();
    let err = FrameSequenceEncoder::default()
        .encode(Vec::new(), &OutputDestination::Path(path.clone()), writer)
        .unwrap_err();

    assert!(matches!(err, RgbdError::Validation(_)));
    assert!(!rec.is_started());
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
    std::fs::remove_dir_all(&dir).unwrap();
}
