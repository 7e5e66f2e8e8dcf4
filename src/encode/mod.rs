//! Encoding sinks.
//!
//! Sinks consume normalized frames in output order and are driven by [`crate::assemble`].

/// `ffmpeg`-based sink (silent H.264 MP4 via the system `ffmpeg`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
