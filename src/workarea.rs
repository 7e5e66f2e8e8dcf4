//! Per-run scratch directories.
//!
//! Every pipeline run gets its own `run-<uuid>` directory under a shared root, so concurrent
//! requests never see each other's uploads or outputs. The directory is deleted when the
//! [`WorkArea`] is dropped; leftovers from crashed processes are swept by age. Runs that are
//! still alive in this process are never swept, however old their directory looks.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use anyhow::Context as _;
use uuid::Uuid;

use crate::foundation::error::SlideResult;
use crate::sanitize::upload_filename;

/// Directory name prefix for run directories.
pub const RUN_DIR_PREFIX: &str = "run-";

/// Run directories older than this are considered abandoned.
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

const IMAGES_DIR: &str = "images";
const SOURCE_AUDIO_DIR: &str = "source";
const SILENT_VIDEO: &str = "temp.mp4";
const TRIMMED_AUDIO: &str = "audio.wav";
const FINAL_VIDEO: &str = "final.mp4";

static LIVE_RUNS: LazyLock<Mutex<HashSet<Uuid>>> = LazyLock::new(Default::default);

fn live_runs() -> std::sync::MutexGuard<'static, HashSet<Uuid>> {
    LIVE_RUNS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration in [`LIVE_RUNS`]; dropped after the directory itself.
#[derive(Debug)]
struct LiveRun(Uuid);

impl LiveRun {
    fn register(id: Uuid) -> Self {
        live_runs().insert(id);
        Self(id)
    }
}

impl Drop for LiveRun {
    fn drop(&mut self) {
        live_runs().remove(&self.0);
    }
}

/// Scratch directory owned by exactly one pipeline run.
#[derive(Debug)]
pub struct WorkArea {
    id: Uuid,
    dir: tempfile::TempDir,
    _live: LiveRun,
}

impl WorkArea {
    /// Create a fresh, uniquely named run directory under `root`.
    pub fn create(root: &Path) -> SlideResult<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create work root '{}'", root.display()))?;

        let id = Uuid::now_v7();
        let live = LiveRun::register(id);
        let dir = tempfile::Builder::new()
            .prefix(&format!("{RUN_DIR_PREFIX}{id}"))
            .rand_bytes(0)
            .tempdir_in(root)
            .with_context(|| format!("failed to create run directory under '{}'", root.display()))?;
        std::fs::create_dir_all(dir.path().join(IMAGES_DIR))
            .context("failed to create images directory")?;

        tracing::debug!(run_id = %id, dir = %dir.path().display(), "created work area");
        Ok(Self {
            id,
            dir,
            _live: live,
        })
    }

    /// Identity of this run, used in log spans.
    pub fn run_id(&self) -> Uuid {
        self.id
    }

    /// Root of this run's directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Folder holding the uploaded images.
    pub fn images_dir(&self) -> PathBuf {
        self.path().join(IMAGES_DIR)
    }

    /// Silent video written by the assembler.
    pub fn silent_video_path(&self) -> PathBuf {
        self.path().join(SILENT_VIDEO)
    }

    /// Soundtrack cut to the video's duration.
    pub fn trimmed_audio_path(&self) -> PathBuf {
        self.path().join(TRIMMED_AUDIO)
    }

    /// Video with the soundtrack muxed in.
    pub fn final_video_path(&self) -> PathBuf {
        self.path().join(FINAL_VIDEO)
    }

    /// Destination for the `index`-th uploaded image.
    ///
    /// A name that collides with an earlier upload gets an `_<n>` suffix (starting at `index`)
    /// instead of overwriting it.
    pub fn image_upload_path(&self, index: usize, original_name: &str) -> PathBuf {
        let dir = self.images_dir();
        let name = upload_filename(index, original_name, "image");
        let mut path = dir.join(&name);
        let mut n = index;
        while path.exists() {
            path = dir.join(suffixed(&name, n));
            n += 1;
        }
        path
    }

    /// Destination for the uploaded soundtrack, outside the images folder.
    pub fn audio_upload_path(&self, original_name: &str) -> SlideResult<PathBuf> {
        let dir = self.path().join(SOURCE_AUDIO_DIR);
        std::fs::create_dir_all(&dir).context("failed to create audio directory")?;
        Ok(dir.join(upload_filename(0, original_name, "audio")))
    }

    /// Delete the run directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> SlideResult<()> {
        let Self { id, dir, _live } = self;
        dir.close()
            .with_context(|| format!("failed to remove work area for run {id}"))?;
        tracing::debug!(run_id = %id, "removed work area");
        Ok(())
    }

    /// Remove `run-*` directories under `root` last modified more than `older_than` ago.
    ///
    /// Directories of runs still alive in this process are skipped. Returns how many were
    /// removed. A missing root is not an error.
    pub fn sweep_stale(root: &Path, older_than: Duration) -> SlideResult<usize> {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to list work root '{}'", root.display()))
                    .into());
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries {
            let entry = entry.context("failed to read work root entry")?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(suffix) = name.strip_prefix(RUN_DIR_PREFIX) else {
                continue;
            };
            if let Ok(id) = Uuid::parse_str(suffix)
                && live_runs().contains(&id)
            {
                continue;
            }
            let meta = entry.metadata().context("failed to stat run directory")?;
            if !meta.is_dir() {
                continue;
            }
            let age = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age < older_than {
                continue;
            }
            match std::fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    dir = %entry.path().display(),
                    error = %e,
                    "failed to sweep stale run directory"
                ),
            }
        }
        if removed > 0 {
            tracing::info!(removed, "swept stale work areas");
        }
        Ok(removed)
    }
}

fn suffixed(name: &str, index: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{index}.{ext}"),
        None => format!("{name}_{index}"),
    }
}

#[cfg(test)]
#[path = "../tests/unit/workarea.rs"]
mod tests;
