//! HTTP front end: `POST /generate` and the landing page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt as _;
use tokio::io::AsyncWriteExt as _;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

use crate::config::{Config, MAX_BODY_BYTES};
use crate::foundation::core::DEFAULT_SWITCH_TIME;
use crate::foundation::error::SlideError;
use crate::mux::{FfmpegMuxer, Muxer};
use crate::pipeline::run_in_work_area;
use crate::workarea::{STALE_AFTER, WorkArea};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,
    /// Muxer used for the audio merge step.
    pub muxer: Arc<dyn Muxer>,
}

impl AppState {
    /// State that muxes with the configured `ffmpeg`.
    pub fn new(config: Config) -> Self {
        let muxer = Arc::new(FfmpegMuxer::new(config.ffmpeg.clone()));
        Self {
            config: Arc::new(config),
            muxer,
        }
    }
}

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request (missing images, broken multipart body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] SlideError),

    /// Handler plumbing failed (blocking task panicked, result file unreadable).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Pipeline(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.user_message()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "video generation failed".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    let root = config.work_root();
    WorkArea::sweep_stale(&root, STALE_AFTER)?;

    let addr = config.socket_addr();
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, work_root = %root.display(), "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn index(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(&state.config.index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!(
                index = %state.config.index.display(),
                error = %e,
                "landing page unavailable"
            );
            (StatusCode::NOT_FOUND, "index page not found").into_response()
        }
    }
}

async fn generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    tracing::info!("received generate request");
    let root = state.config.work_root();
    let work = tokio::task::spawn_blocking(move || {
        WorkArea::sweep_stale(&root, STALE_AFTER)?;
        WorkArea::create(&root)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let mut image_count = 0usize;
    let mut audio: Option<PathBuf> = None;
    let mut switch_time = DEFAULT_SWITCH_TIME.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                let Some(file_name) = uploaded_file_name(&field) else {
                    continue;
                };
                let path = work.image_upload_path(image_count, &file_name);
                if stream_to_file(field, &path).await? > 0 {
                    image_count += 1;
                } else {
                    let _ = tokio::fs::remove_file(&path).await;
                }
            }
            "audio" => {
                let Some(file_name) = uploaded_file_name(&field) else {
                    continue;
                };
                let path = work.audio_upload_path(&file_name)?;
                if stream_to_file(field, &path).await? > 0 {
                    audio = Some(path);
                }
            }
            "switch_time" => {
                switch_time = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
            }
            _ => {}
        }
    }

    if image_count == 0 {
        return Err(AppError::BadRequest("please select images".to_string()));
    }
    tracing::debug!(images = image_count, with_audio = audio.is_some(), "saved uploads");

    let config = Arc::clone(&state.config);
    let muxer = Arc::clone(&state.muxer);
    let (work, final_path) = tokio::task::spawn_blocking(move || {
        let final_path = run_in_work_area(
            &work,
            &switch_time,
            audio.as_deref(),
            &config.ffmpeg,
            muxer.as_ref(),
        )?;
        Ok::<_, SlideError>((work, final_path))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let file_name = attachment_name(&final_path);
    let file = tokio::fs::File::open(&final_path)
        .await
        .map_err(|e| AppError::Internal(format!("open result video: {e}")))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("stat result video: {e}")))?
        .len();

    // The run directory is removed once the body stream is dropped.
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _work = &work;
        chunk
    });

    tracing::info!(file = %file_name, bytes = len, "sending video");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("build response: {e}")))
}

/// Client filename of a file field; `None` for the empty part a browser sends when no file was
/// chosen.
fn uploaded_file_name(field: &Field<'_>) -> Option<String> {
    field
        .file_name()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Copy a multipart field to `path` chunk by chunk. Returns the number of bytes written.
async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<u64, AppError> {
    let mut file = tokio::io::BufWriter::new(
        tokio::fs::File::create(path)
            .await
            .map_err(|e| AppError::Internal(format!("create upload file: {e}")))?,
    );
    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        written += chunk.len() as u64;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("write upload file: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("flush upload file: {e}")))?;
    Ok(written)
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string())
}
