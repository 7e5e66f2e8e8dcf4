//! Fitting the soundtrack to the silent video and muxing them together.

use std::path::{Path, PathBuf};

use crate::assemble::display_name;
use crate::audio::decode::decode_audio_pcm;
use crate::audio::trim::{trim_to_duration, write_wav};
use crate::foundation::core::SwitchInterval;
use crate::foundation::error::{SlideError, SlideResult};
use crate::mux::Muxer;

/// Inputs and outputs of one merge.
#[derive(Clone, Debug)]
pub struct MergeRequest<'a> {
    /// Silent video produced by the assembler.
    pub silent_video: &'a Path,
    /// Frames in the silent video.
    pub frame_count: u64,
    /// Seconds per frame.
    pub interval: SwitchInterval,
    /// Uploaded soundtrack.
    pub audio: &'a Path,
    /// Where the trimmed WAV is written.
    pub trimmed_audio: &'a Path,
    /// Where the muxed video is written.
    pub out_path: &'a Path,
    /// `ffmpeg` used for decoding the soundtrack.
    pub decoder: &'a Path,
}

/// Trim the soundtrack to `frame_count * interval` and mux it with the silent video.
#[tracing::instrument(skip_all, fields(frame_count = req.frame_count))]
pub fn merge(req: &MergeRequest<'_>, muxer: &dyn Muxer) -> SlideResult<PathBuf> {
    if !req.audio.is_file() {
        return Err(SlideError::not_found(display_name(req.audio)));
    }

    let duration = req.interval.video_duration_secs(req.frame_count);
    let scratch = req.trimmed_audio.parent().unwrap_or(Path::new("."));
    let pcm = decode_audio_pcm(req.decoder, req.audio, scratch)?;
    let trimmed = trim_to_duration(&pcm, duration);
    tracing::info!(
        source_secs = pcm.duration_secs(),
        trimmed_secs = trimmed.duration_secs(),
        video_secs = duration,
        "trimmed soundtrack"
    );
    write_wav(&trimmed, req.trimmed_audio)?;

    muxer.mux(req.silent_video, req.trimmed_audio, req.out_path)?;
    tracing::info!(out = %req.out_path.display(), "merged audio and video");
    Ok(req.out_path.to_path_buf())
}
