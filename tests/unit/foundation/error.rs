use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RgbdError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RgbdError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        RgbdError::allocation("x")
            .to_string()
            .contains("allocation error:")
    );
    assert!(
        RgbdError::append(3, "x")
            .to_string()
            .contains("append error at frame 3:")
    );
    assert!(RgbdError::decode("x").to_string().contains("decode error:"));
    assert!(
        RgbdError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
}

#[test]
fn io_keeps_context_and_source() {
    let err = RgbdError::io("remove 'a.mp4'", std::io::Error::other("denied"));
    let msg = err.to_string();
    assert!(msg.contains("remove 'a.mp4'"));
    assert!(msg.contains("denied"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn into_append_retags_but_preserves_existing_append() {
    let e = RgbdError::allocation("pool gone").into_append(7);
    assert!(matches!(e, RgbdError::Append { frame: 7, ref reason } if reason.contains("pool gone")));

    let e = RgbdError::append(2, "first").into_append(9);
    assert!(matches!(e, RgbdError::Append { frame: 2, .. }));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RgbdError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
