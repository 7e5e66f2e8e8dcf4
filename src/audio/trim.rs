use std::path::Path;

use anyhow::Context as _;

use crate::audio::decode::AudioPcm;
use crate::foundation::error::SlideResult;

/// Whole milliseconds of `secs`, floored.
pub fn duration_ms_floor(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).floor() as u64
}

/// Number of sample frames covering `ms` milliseconds at `sample_rate`, floored.
pub fn frames_for_ms(ms: u64, sample_rate: u32) -> usize {
    ((u128::from(ms) * u128::from(sample_rate)) / 1000) as usize
}

/// Keep the first `floor(secs * 1000)` milliseconds of `pcm`.
///
/// Shorter sources are returned whole; the result is never longer than the requested duration.
pub fn trim_to_duration(pcm: &AudioPcm, secs: f64) -> AudioPcm {
    let keep_frames = frames_for_ms(duration_ms_floor(secs), pcm.sample_rate).min(pcm.frames());
    let keep_samples = keep_frames * usize::from(pcm.channels);
    AudioPcm {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        interleaved_f32: pcm.interleaved_f32[..keep_samples].to_vec(),
    }
}

/// Write `pcm` as a 32-bit float WAV file, keeping its rate and channels.
pub fn write_wav(pcm: &AudioPcm, out_path: &Path) -> SlideResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create audio output directory '{}'",
                parent.display()
            )
        })?;
    }

    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(out_path, spec)
        .with_context(|| format!("failed to create wav file '{}'", out_path.display()))?;
    for &sample in &pcm.interleaved_f32 {
        writer
            .write_sample(sample)
            .context("failed to write wav sample")?;
    }
    writer.finalize().context("failed to finalize wav file")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/trim.rs"]
mod tests;
