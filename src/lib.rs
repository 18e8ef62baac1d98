//! # bambara-tts — Bambara text-to-speech inference
//!
//! Inference pipeline for a Spark-TTS style Bambara checkpoint: a Qwen2
//! language model generates text containing embedded BiCodec identifiers,
//! which are parsed out and detokenized into a waveform.
//!
//! ## Pipeline
//!
//! 1. **Prompt building** ([`prompt`]): speaker tag plus control-token
//!    delimiters around the raw text.
//! 2. **Generation** ([`generation`]): autoregressive sampling with
//!    temperature / top-k / top-p, stopping at EOS.
//! 3. **Parsing** ([`parser`]): `<|bicodec_semantic_N|>` and
//!    `<|bicodec_global_N|>` markers extracted from the decoded output.
//! 4. **Synthesis** ([`codec`]): identifiers packed into codec tensors and
//!    detokenized to f32 PCM.
//!
//! ## Quick start
//!
//! ```no_run
//! use bambara_tts::{setup, GenerationParams, Settings, Speaker};
//!
//! let settings = Settings::default();
//! let device = setup::device(false)?;
//! let mut tts = setup::load(&settings, &device)?;
//! let wav = tts.generate_speech(
//!     "aw ni ce",
//!     Some(&Speaker::ADAME),
//!     &GenerationParams::default(),
//!     Some(std::path::Path::new("out.wav")),
//! )?;
//! println!("{} samples at {} Hz", wav.len(), tts.sample_rate());
//! # Ok::<(), bambara_tts::TtsError>(())
//! ```

// Re-export candle types for downstream use.
pub use candle_core::{DType, Device, Tensor};

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;
pub mod generation;
pub mod parser;
pub mod prompt;
pub mod protocol;
pub mod setup;
pub mod speakers;
pub mod tts;

pub use codec::{AudioTokenizer, BiCodec};
pub use config::{Settings, DEFAULT_SAMPLE_RATE};
pub use error::{Result, TtsError};
pub use generation::{GenerationParams, QwenLm, SpeechLm};
pub use parser::CodecIds;
pub use speakers::Speaker;
pub use tts::BambaraTts;
