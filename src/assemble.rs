//! Turning an ordered image sequence into a silent video, one frame per image.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Resolution, SwitchInterval, TARGET_RESOLUTION};
use crate::foundation::error::{SlideError, SlideResult};
use crate::normalize::{normalize, to_bgr24};

/// Image extensions accepted as slides (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Return `true` when `path` has one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Non-empty, filename-sorted list of slide images. Order here is playback order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequence {
    files: Vec<PathBuf>,
}

impl FrameSequence {
    /// Build a sequence from arbitrary paths: unsupported extensions are dropped, the rest is
    /// sorted by file name.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> SlideResult<Self> {
        let mut files: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| is_supported_image(p))
            .collect();
        if files.is_empty() {
            return Err(SlideError::input("no valid image files found"));
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self { files })
    }

    /// Image paths in playback order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of images, which is also the number of frames.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// List the supported images directly inside `folder`.
pub fn list_images(folder: &Path) -> SlideResult<FrameSequence> {
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("failed to list image folder '{}'", folder.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.context("failed to read image folder entry")?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            paths.push(entry.path());
        }
    }
    FrameSequence::from_paths(paths)
}

/// What the assembler produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssembledVideo {
    /// Frames written, one per image.
    pub frame_count: u64,
    /// Output frame rate.
    pub fps: Fps,
}

impl AssembledVideo {
    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }
}

/// Silent video file on disk plus its frame accounting.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoArtifact {
    /// Path of the encoded file.
    pub path: PathBuf,
    /// Frames in the file.
    pub frame_count: u64,
    /// Playback duration in seconds.
    pub duration_secs: f64,
}

/// Normalize every image in `seq` and push it to `sink` as exactly one frame.
#[tracing::instrument(skip_all, fields(images = seq.len(), switch_secs = interval.secs()))]
pub fn assemble(
    seq: &FrameSequence,
    interval: SwitchInterval,
    target: Resolution,
    sink: &mut dyn FrameSink,
) -> SlideResult<AssembledVideo> {
    let fps = interval.fps()?;
    sink.begin(SinkConfig {
        width: target.width,
        height: target.height,
        fps,
    })?;

    let mut frame_count = 0u64;
    for (i, path) in seq.files().iter().enumerate() {
        let image = decode_slide(path)?;
        let frame = normalize(&image, target)?;
        sink.push_frame(FrameIndex(i as u64), &to_bgr24(&frame))?;
        frame_count += 1;
        tracing::debug!(frame = i, file = %display_name(path), "wrote frame");
    }

    sink.end()?;
    tracing::info!(frame_count, %fps, "assembled silent video");
    Ok(AssembledVideo { frame_count, fps })
}

/// [`assemble`] into an MP4 at `out_path` using `ffmpeg` at `program`.
pub fn assemble_to_file(
    seq: &FrameSequence,
    interval: SwitchInterval,
    out_path: &Path,
    program: &Path,
) -> SlideResult<VideoArtifact> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path).with_program(program));
    let video = assemble(seq, interval, TARGET_RESOLUTION, &mut sink)?;
    Ok(VideoArtifact {
        path: out_path.to_path_buf(),
        frame_count: video.frame_count,
        duration_secs: video.duration_secs(),
    })
}

fn decode_slide(path: &Path) -> SlideResult<image::DynamicImage> {
    let name = display_name(path);
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .with_context(|| format!("failed to open image '{name}'"))?;
    reader.decode().map_err(|e| {
        tracing::error!(file = %name, error = %e, "image decode failed");
        SlideError::input(format!("cannot decode image '{name}'"))
    })
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/unit/assemble.rs"]
mod tests;
