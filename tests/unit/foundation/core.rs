use super::*;

#[test]
fn target_is_portrait_nine_by_sixteen() {
    assert_eq!(TARGET_RESOLUTION.width, 1080);
    assert_eq!(TARGET_RESOLUTION.height, 1920);
    assert!((TARGET_RESOLUTION.ratio() - 0.5625).abs() < 1e-12);
}

#[test]
fn half_second_interval_is_two_fps() {
    let interval = SwitchInterval::parse("0.5").unwrap();
    let fps = interval.fps().unwrap();
    assert_eq!(fps, Fps { num: 2, den: 1 });
    assert_eq!(fps.to_string(), "2/1");
    assert!((fps.frames_to_secs(10) - 5.0).abs() < 1e-12);
    assert!((interval.video_duration_secs(10) - 5.0).abs() < 1e-12);
}

#[test]
fn fractional_interval_stays_exact() {
    let fps = SwitchInterval::parse("0.3").unwrap().fps().unwrap();
    assert_eq!(fps, Fps { num: 10, den: 3 });

    let fps = SwitchInterval::parse("3").unwrap().fps().unwrap();
    assert_eq!(fps, Fps { num: 1, den: 3 });
}

#[test]
fn parse_trims_and_accepts_exponents() {
    assert_eq!(SwitchInterval::parse("  2 ").unwrap().secs(), 2.0);
    assert_eq!(SwitchInterval::parse("1e-1").unwrap().secs(), 0.1);
}

#[test]
fn parse_rejects_non_positive_and_garbage() {
    for raw in ["0", "-1", "", "abc", "inf", "NaN", "0.0"] {
        let err = SwitchInterval::parse(raw).unwrap_err();
        assert!(matches!(err, SlideError::Input(_)), "{raw:?} -> {err:?}");
    }
}

#[test]
fn sub_microsecond_interval_is_rejected() {
    let interval = SwitchInterval::from_secs(1e-9).unwrap();
    assert!(matches!(interval.fps(), Err(SlideError::Input(_))));
}

#[test]
fn fps_new_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(1, 0).is_err());
    assert!((Fps::new(30000, 1001).unwrap().as_f64() - 29.97).abs() < 0.01);
}
