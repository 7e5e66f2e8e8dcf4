use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(2, 1).unwrap(),
    }
}

fn scratch_out(name: &str) -> PathBuf {
    PathBuf::from("target").join("unit_ffmpeg").join(name)
}

#[test]
fn odd_dimensions_fail_as_encoder_init() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(scratch_out("odd.mp4")));
    let err = sink.begin(cfg(1081, 1920)).unwrap_err();
    assert!(matches!(err, SlideError::EncoderInit(_)), "{err:?}");
}

#[test]
fn missing_program_fails_as_encoder_init() {
    let opts = FfmpegSinkOpts::new(scratch_out("missing.mp4"))
        .with_program("definitely-not-a-real-ffmpeg-binary");
    let mut sink = FfmpegSink::new(opts);
    let err = sink.begin(cfg(16, 16)).unwrap_err();
    assert!(matches!(err, SlideError::EncoderInit(_)), "{err:?}");
}

#[test]
fn push_before_begin_is_rejected() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(scratch_out("unstarted.mp4")));
    let frame = FrameBgr24 {
        width: 2,
        height: 2,
        data: vec![0; 12],
    };
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert!(matches!(err, SlideError::Encode(_)));
}

#[test]
fn encodes_frames_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let out = scratch_out("three_frames.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16)).unwrap();
    for i in 0..3u64 {
        let frame = FrameBgr24 {
            width: 16,
            height: 16,
            data: vec![(i * 60) as u8; FrameBgr24::byte_len(16, 16)],
        };
        sink.push_frame(FrameIndex(i), &frame).unwrap();
    }
    assert_eq!(sink.frames_written(), 3);

    let err = sink
        .push_frame(
            FrameIndex(1),
            &FrameBgr24 {
                width: 16,
                height: 16,
                data: vec![0; FrameBgr24::byte_len(16, 16)],
            },
        )
        .unwrap_err();
    assert!(matches!(err, SlideError::Encode(_)));

    sink.end().unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

/// Shell script that passes the `-version` check but rejects every encode.
#[cfg(unix)]
fn broken_encoder(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let path = dir.join("ffmpeg");
    std::fs::write(
        &path,
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then echo 'ffmpeg version test'; exit 0; fi\n\
         echo \"Unknown encoder 'libx264'\" >&2\n\
         exit 1\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn encoder_that_exits_at_startup_is_an_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let program = broken_encoder(dir.path());
    let out = dir.path().join("out").join("video.mp4");

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out).with_program(&program));
    // Frames larger than a pipe buffer so the write cannot complete after ffmpeg exits.
    let (w, h) = (256, 256);
    let result = sink.begin(cfg(w, h)).and_then(|()| {
        for i in 0..3u64 {
            let frame = FrameBgr24 {
                width: w,
                height: h,
                data: vec![7; FrameBgr24::byte_len(w, h)],
            };
            sink.push_frame(FrameIndex(i), &frame)?;
        }
        sink.end()
    });

    let err = result.unwrap_err();
    assert!(matches!(err, SlideError::EncoderInit(_)), "{err:?}");
    assert_eq!(err.user_message(), "video encoder initialization failed");
    assert!(!out.exists());
}

#[test]
fn stale_output_is_replaced_on_begin() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    std::fs::write(&out, b"old bytes").unwrap();

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16)).unwrap();
    sink.push_frame(
        FrameIndex(0),
        &FrameBgr24 {
            width: 16,
            height: 16,
            data: vec![0; FrameBgr24::byte_len(16, 16)],
        },
    )
    .unwrap();
    sink.end().unwrap();
    assert_ne!(std::fs::read(&out).unwrap(), b"old bytes");
}
