//! Control-token vocabulary shared with the Spark-TTS checkpoint.
//!
//! These strings are a wire contract with the trained language model: the
//! checkpoint was fine-tuned on prompts delimited by exactly these markers
//! and emits codec identifiers in exactly these shapes. Changing any of them
//! breaks compatibility with the published weights, so they live here as
//! versioned constants rather than inline literals.

/// Opens a text-to-speech task.
pub const TASK_TTS: &str = "<|task_tts|>";
/// Opens the raw text section of the prompt.
pub const START_CONTENT: &str = "<|start_content|>";
/// Closes the raw text section of the prompt.
pub const END_CONTENT: &str = "<|end_content|>";
/// Signals the model to start emitting global (speaker/style) tokens.
pub const START_GLOBAL_TOKEN: &str = "<|start_global_token|>";

/// Lexical pattern of an embedded semantic codec identifier, capturing the
/// decimal codebook index.
pub const SEMANTIC_ID_PATTERN: &str = r"<\|bicodec_semantic_(\d+)\|>";
/// Lexical pattern of an embedded global codec identifier.
pub const GLOBAL_ID_PATTERN: &str = r"<\|bicodec_global_(\d+)\|>";
