use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SlideError::input("x").to_string().contains("input error:"));
    assert!(SlideError::not_found("x").to_string().contains("not found:"));
    assert!(
        SlideError::encoder_init("x")
            .to_string()
            .contains("encoder initialization error:")
    );
    assert!(SlideError::encode("x").to_string().contains("encode error:"));
    assert!(SlideError::merge("x").to_string().contains("merge error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlideError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Unexpected);
}

#[test]
fn user_message_hides_internal_detail() {
    let err = SlideError::merge("ffmpeg exited with status 1 for /tmp/run-x/final.mp4");
    assert_eq!(err.user_message(), "audio merge failed");

    let err = SlideError::Other(anyhow::anyhow!("io error at /var/lib/secret"));
    assert!(!err.user_message().contains("/var"));
}

#[test]
fn user_message_passes_input_detail_through() {
    let err = SlideError::input("no valid image files found");
    assert_eq!(err.user_message(), "no valid image files found");
    assert_eq!(err.kind(), ErrorKind::Input);

    let err = SlideError::not_found("song.mp3");
    assert_eq!(err.user_message(), "file not found: song.mp3");
}

#[test]
fn kind_serializes_as_snake_case() {
    let v = serde_json::to_value(ErrorKind::EncoderInit).unwrap();
    assert_eq!(v, serde_json::json!("encoder_init"));
}
