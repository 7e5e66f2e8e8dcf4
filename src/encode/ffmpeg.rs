use crate::encode::sink::{FrameBgr24, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SlideError, SlideResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path. An existing file is replaced.
    pub out_path: PathBuf,
    /// `ffmpeg` executable name or path.
    pub program: PathBuf,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path` with the `ffmpeg` found on `PATH`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Use a specific `ffmpeg` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

/// Sink that spawns `ffmpeg` and streams raw `bgr24` frames to its stdin.
///
/// Output is silent H.264 (`libx264`, `yuv420p`) in an MP4 container.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Number of frames accepted since the last `begin`.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Reap a failed encoder and classify the failure.
    ///
    /// The encoder counts as never opened when ffmpeg died before taking a single frame or
    /// before creating the output file (unknown codec, unwritable path, bad arguments).
    fn fail(&mut self, detail: String) -> SlideError {
        drop(self.stdin.take());
        let status = self.child.take().and_then(|mut child| child.wait().ok());
        let stderr = self.drain_stderr();
        tracing::error!(
            status = ?status,
            stderr = %stderr.trim(),
            frames = self.frames_written,
            "ffmpeg encoder failed"
        );
        self.cfg = None;

        if self.frames_written == 0 || !self.opts.out_path.is_file() {
            SlideError::encoder_init(format!("ffmpeg could not open the encoder: {detail}"))
        } else {
            SlideError::encode(detail)
        }
    }

    fn drain_stderr(&mut self) -> String {
        let Some(handle) = self.stderr_drain.take() else {
            return String::new();
        };
        match handle.join() {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Err(e)) => format!("<stderr read failed: {e}>"),
            Err(_) => "<stderr drain thread panicked>".to_string(),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(SlideError::encoder_init("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SlideError::encoder_init(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SlideError::encoder_init(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)
            .map_err(|e| SlideError::encoder_init(format!("cannot prepare output: {e:#}")))?;
        match std::fs::remove_file(&self.opts.out_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SlideError::encoder_init(format!(
                    "cannot replace existing output: {e}"
                )));
            }
        }

        if !is_program_available(&self.opts.program) {
            return Err(SlideError::encoder_init(
                "ffmpeg is required for MP4 encoding, but was not found",
            ));
        }

        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgr24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        tracing::debug!(
            out = %self.opts.out_path.display(),
            fps = %cfg.fps,
            "spawning ffmpeg encoder"
        );
        let mut child = cmd.spawn().map_err(|e| {
            SlideError::encoder_init(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlideError::encoder_init("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlideError::encoder_init("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameBgr24) -> SlideResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SlideError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SlideError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SlideError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != FrameBgr24::byte_len(cfg.width, cfg.height) {
            return Err(SlideError::encode(
                "frame.data size mismatch with width*height*3",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SlideError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&frame.data) {
            return Err(self.fail(format!("failed to write frame {} to ffmpeg: {e}", idx.0)));
        }
        self.last_idx = Some(idx);
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> SlideResult<()> {
        drop(self.stdin.take());
        let Some(child) = self.child.as_mut() else {
            return Err(SlideError::encode("ffmpeg sink not started"));
        };

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => return Err(self.fail(format!("failed to wait for ffmpeg: {e}"))),
        };
        if !status.success() {
            return Err(self.fail(format!("ffmpeg exited with status {status}")));
        }
        self.child = None;
        let stderr = self.drain_stderr();
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "ffmpeg encoder diagnostics");
        }

        tracing::debug!(frames = self.frames_written, "ffmpeg encoder finished");
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Abandoned mid-run: close stdin and reap the child so it does not linger.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &fps.to_string()]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlideResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_available(Path::new("ffmpeg"))
}

/// Return `true` when `program -version` runs successfully.
pub fn is_program_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
