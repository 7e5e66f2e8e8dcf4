//! Run orchestration: collect inputs, assemble, optionally merge audio.

use std::path::{Path, PathBuf};

use crate::assemble::{assemble_to_file, list_images};
use crate::foundation::core::SwitchInterval;
use crate::foundation::error::SlideResult;
use crate::merge::{MergeRequest, merge};
use crate::mux::Muxer;
use crate::workarea::WorkArea;

/// Lifecycle of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing started yet.
    Idle,
    /// Listing images and parsing the switch interval.
    CollectingInputs,
    /// Encoding the silent video.
    Assembling,
    /// Trimming and muxing the soundtrack.
    MergingAudio,
    /// Final artifact is ready.
    Done,
    /// A stage failed; see the returned error.
    Failed,
}

/// Where a run reads images from and writes its artifacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunPaths {
    /// Folder scanned for slide images.
    pub images_dir: PathBuf,
    /// Silent video output.
    pub silent_video: PathBuf,
    /// Trimmed soundtrack output.
    pub trimmed_audio: PathBuf,
    /// Muxed video output.
    pub final_video: PathBuf,
}

impl RunPaths {
    /// Standard layout inside a [`WorkArea`].
    pub fn in_work_area(work: &WorkArea) -> Self {
        Self {
            images_dir: work.images_dir(),
            silent_video: work.silent_video_path(),
            trimmed_audio: work.trimmed_audio_path(),
            final_video: work.final_video_path(),
        }
    }
}

/// One run's inputs.
#[derive(Clone, Debug)]
pub struct RunRequest<'a> {
    /// Artifact locations.
    pub paths: &'a RunPaths,
    /// Raw switch interval as received from the caller.
    pub switch_time: &'a str,
    /// Optional soundtrack.
    pub audio: Option<&'a Path>,
    /// `ffmpeg` used for encoding and audio decoding.
    pub ffmpeg: &'a Path,
}

struct Run {
    state: RunState,
}

impl Run {
    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}

/// Execute a run and return the path of the final artifact.
///
/// Without audio the silent video is final; with audio the muxed video is. Any stage failure is
/// logged here with full detail and returned unchanged.
pub fn run(req: &RunRequest<'_>, muxer: &dyn Muxer) -> SlideResult<PathBuf> {
    let mut run = Run {
        state: RunState::Idle,
    };
    match execute(&mut run, req, muxer) {
        Ok(path) => {
            run.advance(RunState::Done);
            Ok(path)
        }
        Err(err) => {
            let failed_in = run.state;
            run.advance(RunState::Failed);
            tracing::error!(
                stage = ?failed_in,
                kind = ?err.kind(),
                error = ?err,
                "video generation failed"
            );
            Err(err)
        }
    }
}

/// [`run`] inside a [`WorkArea`] using its standard layout.
pub fn run_in_work_area(
    work: &WorkArea,
    switch_time: &str,
    audio: Option<&Path>,
    ffmpeg: &Path,
    muxer: &dyn Muxer,
) -> SlideResult<PathBuf> {
    let span = tracing::info_span!("run", run_id = %work.run_id());
    let _guard = span.enter();
    let paths = RunPaths::in_work_area(work);
    run(
        &RunRequest {
            paths: &paths,
            switch_time,
            audio,
            ffmpeg,
        },
        muxer,
    )
}

fn execute(run: &mut Run, req: &RunRequest<'_>, muxer: &dyn Muxer) -> SlideResult<PathBuf> {
    run.advance(RunState::CollectingInputs);
    let seq = list_images(&req.paths.images_dir)?;
    let interval = SwitchInterval::parse(req.switch_time)?;
    tracing::info!(
        images = seq.len(),
        switch_secs = interval.secs(),
        with_audio = req.audio.is_some(),
        "starting run"
    );

    run.advance(RunState::Assembling);
    let video = assemble_to_file(&seq, interval, &req.paths.silent_video, req.ffmpeg)?;
    tracing::info!(
        path = %video.path.display(),
        frames = video.frame_count,
        secs = video.duration_secs,
        "silent video ready"
    );

    let Some(audio) = req.audio else {
        return Ok(video.path);
    };

    run.advance(RunState::MergingAudio);
    merge(
        &MergeRequest {
            silent_video: &video.path,
            frame_count: video.frame_count,
            interval,
            audio,
            trimmed_audio: &req.paths.trimmed_audio,
            out_path: &req.paths.final_video,
            decoder: req.ffmpeg,
        },
        muxer,
    )
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
