//! Combining the silent video and the trimmed soundtrack into the final container.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{SlideError, SlideResult};

/// Constant rate factor used when re-encoding video during the mux.
pub const MUX_CRF: u8 = 23;

/// Something that can mux a video stream and an audio stream into `out_path`.
pub trait Muxer: Send + Sync {
    /// Combine `video_path` and `audio_path` into `out_path`.
    fn mux(&self, video_path: &Path, audio_path: &Path, out_path: &Path) -> SlideResult<()>;
}

/// [`Muxer`] that shells out to the `ffmpeg` CLI.
///
/// Only the exit status is used to decide success; stderr is logged and dropped.
#[derive(Clone, Debug)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegMuxer {
    /// Mux with the given `ffmpeg` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable used for muxing.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list passed to `ffmpeg`.
    pub fn args(video_path: &Path, audio_path: &Path, out_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into()];
        args.push(video_path.into());
        args.push("-i".into());
        args.push(audio_path.into());
        args.extend(
            ["-c:v", "libx264", "-crf"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(MUX_CRF.to_string().into());
        args.push(out_path.into());
        args
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(&self, video_path: &Path, audio_path: &Path, out_path: &Path) -> SlideResult<()> {
        let output = Command::new(&self.program)
            .args(Self::args(video_path, audio_path, out_path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SlideError::merge(format!("failed to spawn ffmpeg for merge: {e}")))?;

        if !output.status.success() {
            tracing::error!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ffmpeg merge failed"
            );
            return Err(SlideError::merge(format!(
                "ffmpeg merge exited with status {}",
                output.status
            )));
        }
        tracing::debug!(out = %out_path.display(), "ffmpeg merge finished");
        Ok(())
    }
}
