/// Convenience result alias used across slidereel.
pub type SlideResult<T> = Result<T, SlideError>;

/// Error type returned by every pipeline stage.
///
/// Each variant maps to one failure class. Variants carry a short message that is safe to show
/// to a caller: no absolute paths, no encoder diagnostics. Full detail goes to the log.
#[derive(thiserror::Error, Debug)]
pub enum SlideError {
    /// Unusable caller input: no images, bad switch interval, undecodable image.
    #[error("input error: {0}")]
    Input(String),

    /// A referenced file does not exist. The message names the base name only.
    #[error("not found: {0}")]
    NotFound(String),

    /// The video encoder could not be opened.
    #[error("encoder initialization error: {0}")]
    EncoderInit(String),

    /// The encoder failed after it was opened (frame write or finalize).
    #[error("encode error: {0}")]
    Encode(String),

    /// Audio preparation or the external mux step failed.
    #[error("merge error: {0}")]
    Merge(String),

    /// Anything else (I/O with context, join errors, ...).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`SlideError`], serialized into logs and responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`SlideError::Input`].
    Input,
    /// See [`SlideError::NotFound`].
    NotFound,
    /// See [`SlideError::EncoderInit`].
    EncoderInit,
    /// See [`SlideError::Encode`].
    Encode,
    /// See [`SlideError::Merge`].
    Merge,
    /// See [`SlideError::Other`].
    Unexpected,
}

impl SlideError {
    /// Build an [`SlideError::Input`].
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build an [`SlideError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build an [`SlideError::EncoderInit`].
    pub fn encoder_init(msg: impl Into<String>) -> Self {
        Self::EncoderInit(msg.into())
    }

    /// Build an [`SlideError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`SlideError::Merge`].
    pub fn merge(msg: impl Into<String>) -> Self {
        Self::Merge(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EncoderInit(_) => ErrorKind::EncoderInit,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Merge(_) => ErrorKind::Merge,
            Self::Other(_) => ErrorKind::Unexpected,
        }
    }

    /// Short, caller-facing message.
    ///
    /// Input and not-found messages are passed through since they describe the caller's own
    /// data. Everything else collapses to a fixed summary.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(msg) => msg.clone(),
            Self::NotFound(msg) => format!("file not found: {msg}"),
            Self::EncoderInit(_) => "video encoder initialization failed".to_string(),
            Self::Encode(_) => "video encoding failed".to_string(),
            Self::Merge(_) => "audio merge failed".to_string(),
            Self::Other(_) => "video generation failed".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
