//! Error types for the Bambara TTS pipeline.

use thiserror::Error;

pub type Result<T, E = TtsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TtsError {
    /// Input text was empty; rejected before any model work.
    #[error("text cannot be empty")]
    EmptyText,

    /// Speaker identifier outside the fixed registry enumeration.
    #[error("speaker id '{id}' is not supported; available ids: {available:?}")]
    UnsupportedSpeaker {
        id: String,
        available: &'static [&'static str],
    },

    /// Display-name lookup missed; the message enumerates valid names.
    #[error("no speaker named '{name}'; available names: {available:?}")]
    UnknownSpeakerName {
        name: String,
        available: &'static [&'static str],
    },

    /// Tokenizer loading, encoding or decoding failure.
    #[error("tokenizer: {0}")]
    Tokenizer(String),

    /// Hugging Face Hub download failure.
    #[error("hub download: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),

    /// The decode loop ran out of model context before reaching EOS.
    #[error("context window of {limit} tokens exhausted after {used} tokens")]
    ContextWindowExceeded { used: usize, limit: usize },

    /// Codec graph problems (missing files, unexpected inputs/outputs).
    #[error("codec: {0}")]
    Codec(String),

    /// Model provisioning failure (missing or malformed repository assets).
    #[error("model resources: {0}")]
    Resource(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TtsError {
    /// True for errors caused by the caller's input rather than by the
    /// model, codec or environment. Input errors are always surfaced before
    /// any generation work starts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TtsError::EmptyText
                | TtsError::UnsupportedSpeaker { .. }
                | TtsError::UnknownSpeakerName { .. }
        )
    }
}
