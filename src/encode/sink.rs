use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SlideError, SlideResult};

/// One packed `bgr24` frame, the channel order the encoder input expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBgr24 {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes, row-major, B,G,R per pixel.
    pub data: Vec<u8>,
}

impl FrameBgr24 {
    /// Expected byte length for a `width x height` frame.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }
}

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Consumer of encoded-to-be frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, exactly
/// once per source image.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed. Failure here is an encoder-initialization error.
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameBgr24) -> SlideResult<()>;
    /// Called once after the last frame; flushes and closes the output.
    fn end(&mut self) -> SlideResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameBgr24)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameBgr24)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameBgr24) -> SlideResult<()> {
        if self.cfg.is_none() {
            return Err(SlideError::encode("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SlideResult<()> {
        self.finished = true;
        Ok(())
    }
}
