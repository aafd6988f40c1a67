use super::*;

#[test]
fn fps_rejects_zero_terms() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::default(), Fps::new(30, 1).unwrap());
}

#[test]
fn frame_timestamps_are_index_over_fps() {
    let fps = Fps::new(30, 1).unwrap();
    for i in 0..90u64 {
        let t = PresentationTime::for_frame(FrameIndex(i), fps);
        assert_eq!(t, PresentationTime::new(i as i64, 30).unwrap());
        assert!((t.as_secs_f64() - i as f64 / 30.0).abs() < 1e-12);
    }
    assert_eq!(
        PresentationTime::for_frame(FrameIndex(0), fps),
        PresentationTime::ZERO
    );
}

#[test]
fn frame_timestamps_strictly_increase_for_rational_fps() {
    let fps = Fps::new(30000, 1001).unwrap();
    let mut prev = PresentationTime::for_frame(FrameIndex(0), fps);
    for i in 1..200u64 {
        let t = PresentationTime::for_frame(FrameIndex(i), fps);
        assert!(t > prev);
        prev = t;
    }
}

#[test]
fn presentation_time_compares_rationally() {
    let a = PresentationTime::new(1, 30).unwrap();
    let b = PresentationTime::new(2, 60).unwrap();
    let c = PresentationTime::new(3, 60).unwrap();
    assert_eq!(a, b);
    assert!(c > a);
    assert!(PresentationTime::new(1, 0).is_err());
}

#[test]
fn canvas_size_is_float_geometry() {
    let c = Canvas {
        width: 640,
        height: 480,
    };
    assert_eq!(c.size(), Size::new(640.0, 480.0));
}
