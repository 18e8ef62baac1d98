//! End-to-end inference facade.
//!
//! Wires the prompt builder, generation driver, token-stream parser and
//! waveform synthesizer into one request/response call. A request moves
//! through validation, prompting, generation, parsing and synthesis in that
//! order; validation failures are surfaced before any model work starts.

use std::path::Path;

use tracing::{debug, info};

use crate::audio::write_pcm_as_wav;
use crate::codec::{self, AudioTokenizer};
use crate::error::{Result, TtsError};
use crate::generation::{GenerationParams, SpeechLm};
use crate::parser;
use crate::prompt;
use crate::speakers::Speaker;

/// The Bambara TTS pipeline over a loaded language model and codec.
///
/// One synchronous request at a time: `generate_speech` takes `&mut self`
/// because the language model's KV cache is per-call mutable state. Share a
/// loaded instance across threads only behind external mutual exclusion.
pub struct BambaraTts<L, C> {
    lm: L,
    codec: C,
}

impl<L: SpeechLm, C: AudioTokenizer> BambaraTts<L, C> {
    pub fn new(lm: L, codec: C) -> Self {
        Self { lm, codec }
    }

    /// Synthesize speech for `text`, optionally tagged with a speaker and
    /// optionally persisted to `output_path`.
    ///
    /// Returns the waveform at [`AudioTokenizer::sample_rate`]. An empty
    /// waveform is a valid outcome (the model emitted no semantic tokens);
    /// in that case no file is written and no error is raised. The file is
    /// written before returning when the waveform is non-empty and a path
    /// was requested; write failures propagate undecorated.
    pub fn generate_speech(
        &mut self,
        text: &str,
        speaker: Option<&Speaker>,
        params: &GenerationParams,
        output_path: Option<&Path>,
    ) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let prompt = prompt::build(text, speaker);
        let waveform = self.run(&prompt, params)?;

        if !waveform.is_empty()
            && let Some(path) = output_path
        {
            let sample_rate = self.codec.sample_rate();
            write_pcm_as_wav(path, &waveform, sample_rate)?;
            info!(path = %path.display(), samples = waveform.len(), sample_rate, "wrote waveform");
        }
        Ok(waveform)
    }

    /// Low-level entry point: synthesize from already-formatted text (the
    /// speaker tag, if any, is expected to be in place).
    pub fn synthesize_formatted(
        &mut self,
        text: &str,
        params: &GenerationParams,
    ) -> Result<Vec<f32>> {
        let prompt = prompt::build(text, None);
        self.run(&prompt, params)
    }

    /// The codec's declared output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.codec.sample_rate()
    }

    pub fn lm(&self) -> &L {
        &self.lm
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn run(&mut self, prompt: &str, params: &GenerationParams) -> Result<Vec<f32>> {
        debug!(prompt_len = prompt.len(), "built prompt");
        let token_text = self.lm.generate(prompt, params)?;
        let ids = parser::parse(&token_text);
        debug!(
            semantic = ids.semantic.len(),
            global = ids.global.len(),
            "parsed token stream"
        );
        codec::synthesize(&self.codec, &ids)
    }
}
