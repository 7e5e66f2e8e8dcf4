//! Server configuration from flags and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context as _;

use crate::foundation::error::SlideResult;

/// Largest accepted request body (2 GiB).
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// HTTP server settings. Every flag can also come from the environment or a `.env` file.
#[derive(clap::Args, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "SLIDEREEL_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(long, env = "SLIDEREEL_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding per-run scratch directories (defaults to `<tmp>/slidereel`).
    #[arg(long, env = "SLIDEREEL_WORK_ROOT")]
    pub work_root: Option<PathBuf>,

    /// Landing page served at `/`.
    #[arg(long, env = "SLIDEREEL_INDEX", default_value = "index.html")]
    pub index: PathBuf,

    /// `ffmpeg` executable used for encoding, decoding, and muxing.
    #[arg(long, env = "SLIDEREEL_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            work_root: None,
            index: PathBuf::from("index.html"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl Config {
    /// Socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Resolved scratch root.
    pub fn work_root(&self) -> PathBuf {
        self.work_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("slidereel"))
    }

    /// Check the configuration before serving: the work root must be creatable. A missing
    /// `ffmpeg` is only warned about since `/` still works without it.
    pub fn validate(&self) -> SlideResult<()> {
        let root = self.work_root();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("work root '{}' is not usable", root.display()))?;
        if !crate::encode::ffmpeg::is_program_available(&self.ffmpeg) {
            tracing::warn!(
                ffmpeg = %self.ffmpeg.display(),
                "ffmpeg not found; /generate will fail"
            );
        }
        if !self.index.is_file() {
            tracing::warn!(
                index = %self.index.display(),
                "landing page not found; / will return 404"
            );
        }
        Ok(())
    }
}
