use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SlideError, SlideResult};

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode any ffmpeg-readable audio file to interleaved `f32` PCM.
///
/// The source's sample rate and channel layout are kept. ffmpeg writes a float WAV into
/// `scratch_dir`, which is read back with `hound` and removed.
#[tracing::instrument(skip(program, scratch_dir))]
pub fn decode_audio_pcm(program: &Path, path: &Path, scratch_dir: &Path) -> SlideResult<AudioPcm> {
    std::fs::create_dir_all(scratch_dir).with_context(|| {
        format!(
            "failed to create audio scratch directory '{}'",
            scratch_dir.display()
        )
    })?;
    let decoded = tempfile::Builder::new()
        .prefix("decoded-")
        .suffix(".wav")
        .tempfile_in(scratch_dir)
        .context("failed to create decoded audio file")?;

    let out = std::process::Command::new(program)
        .args(["-v", "error", "-y", "-i"])
        .arg(path)
        .args(["-vn", "-c:a", "pcm_f32le", "-f", "wav"])
        .arg(decoded.path())
        .output()
        .map_err(|e| SlideError::merge(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        tracing::error!(status = %out.status, stderr = %msg.trim(), "audio decode failed");
        return Err(SlideError::merge(format!(
            "ffmpeg audio decode exited with status {}",
            out.status
        )));
    }

    let pcm = read_wav_f32(decoded.path())?;
    tracing::debug!(
        sample_rate = pcm.sample_rate,
        channels = pcm.channels,
        samples = pcm.interleaved_f32.len(),
        "decoded audio"
    );
    Ok(pcm)
}

/// Read a WAV file into interleaved `f32`, scaling integer samples to `[-1, 1]`.
pub fn read_wav_f32(path: &Path) -> SlideResult<AudioPcm> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| SlideError::merge(format!("failed to read decoded audio: {e}")))?;
    let spec = reader.spec();

    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << spec.bits_per_sample.saturating_sub(1).min(63)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect()
        }
    };
    let interleaved_f32 =
        samples.map_err(|e| SlideError::merge(format!("failed to read decoded audio: {e}")))?;

    Ok(AudioPcm {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        interleaved_f32,
    })
}
