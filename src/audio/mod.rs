//! Soundtrack preparation: decode through `ffmpeg`, cut to the video length, write WAV.

/// `ffmpeg`-backed decode to interleaved `f32` PCM.
pub mod decode;
/// Millisecond-floor trimming and WAV output.
pub mod trim;
