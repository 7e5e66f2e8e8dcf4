//! slidereel turns a batch of images, plus an optional soundtrack, into a vertical slideshow video.
//!
//! # Pipeline overview
//!
//! 1. **Collect**: list the supported images in a folder, sorted by filename
//!    ([`assemble::list_images`])
//! 2. **Normalize**: center-crop each image to 9:16 and resize it to 1080x1920 ([`normalize`])
//! 3. **Assemble**: stream one frame per image to the system `ffmpeg` at `1 / switch_time` fps
//!    ([`assemble`], [`encode`])
//! 4. **Merge** (optional): cut the soundtrack to the video's length and mux it in
//!    ([`merge`], [`mux`])
//!
//! [`pipeline::run`] sequences these stages. Each HTTP request gets its own [`workarea::WorkArea`],
//! so concurrent runs never share scratch files.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image-sequence to silent-video assembly.
pub mod assemble;
/// Soundtrack decoding and trimming.
pub mod audio;
/// Server configuration.
pub mod config;
/// Frame sinks (`ffmpeg`, in-memory).
pub mod encode;
/// Soundtrack merge stage.
pub mod merge;
/// External mux step.
pub mod mux;
/// Crop-and-resize frame normalization.
pub mod normalize;
/// Run orchestration.
pub mod pipeline;
/// Upload filename sanitizing.
pub mod sanitize;
/// HTTP front end.
pub mod server;
/// Per-run scratch directories.
pub mod workarea;

pub use crate::foundation::core::{
    DEFAULT_SWITCH_TIME, Fps, FrameIndex, Resolution, SwitchInterval, TARGET_RESOLUTION,
};
pub use crate::foundation::error::{ErrorKind, SlideError, SlideResult};

pub use crate::assemble::{FrameSequence, VideoArtifact, assemble_to_file, list_images};
pub use crate::config::Config;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameBgr24, FrameSink, InMemorySink, SinkConfig};
pub use crate::mux::{FfmpegMuxer, Muxer};
pub use crate::normalize::{CropWindow, crop_window, normalize};
pub use crate::pipeline::{RunPaths, RunRequest, RunState, run, run_in_work_area};
pub use crate::workarea::WorkArea;
