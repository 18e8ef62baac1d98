//! Autoregressive generation driver.
//!
//! Owns the sampling loop over the Spark-TTS language model (a Qwen2-family
//! checkpoint): prompt tokenization, temperature / top-k / top-p sampling,
//! EOS handling and prompt-echo trimming. The decoded output keeps all
//! special tokens — the parser needs the embedded codec markers intact.

use std::fs::File;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::qwen2::{Config as QwenConfig, ModelForCausalLM};
use tokenizers::Tokenizer;
use tracing::{debug, trace};

use crate::error::{Result, TtsError};
use crate::setup::LmAssets;

/// Sampling parameters for one generation request.
///
/// Decoding is stochastic: two calls with the same prompt and different
/// seeds produce different token streams. Reusing a seed reproduces the
/// stream exactly; there is no other determinism guarantee.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_k: usize,
    pub top_p: f64,
    pub max_new_tokens: usize,
    pub seed: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_k: 50,
            top_p: 1.0,
            max_new_tokens: 2048,
            seed: 42,
        }
    }
}

impl GenerationParams {
    fn sampling(&self) -> Sampling {
        if self.temperature <= 0.0 {
            Sampling::ArgMax
        } else {
            Sampling::TopKThenTopP {
                k: self.top_k,
                p: self.top_p,
                temperature: self.temperature,
            }
        }
    }
}

/// The language-model end of the pipeline, seen through its narrow contract:
/// prompt text in, decoded token text (control tokens preserved) out.
pub trait SpeechLm {
    fn generate(&mut self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

/// EOS markers probed in the tokenizer vocabulary, in priority order.
const EOS_TOKENS: [&str; 2] = ["<|im_end|>", "<|endoftext|>"];

/// Qwen2-backed [`SpeechLm`]. Holds the model, its tokenizer and the device
/// binding established at load time; the generate path never re-binds
/// devices.
pub struct QwenLm {
    model: ModelForCausalLM,
    tokenizer: Tokenizer,
    device: Device,
    eos_token_id: u32,
    max_seq_len: usize,
}

impl QwenLm {
    /// Build the model from downloaded assets, clamping `max_seq_len` to the
    /// checkpoint's declared context length.
    pub fn load(assets: &LmAssets, max_seq_len: usize, device: &Device) -> Result<Self> {
        let config: QwenConfig = serde_json::from_reader(File::open(&assets.config)?)?;
        let dtype = if device.is_cuda() || device.is_metal() {
            DType::BF16
        } else {
            DType::F32
        };
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&assets.weights, dtype, device)? };
        let model = ModelForCausalLM::new(&config, vb)?;
        let tokenizer = Self::load_tokenizer(&assets.tokenizer)?;
        let eos_token_id = EOS_TOKENS
            .iter()
            .find_map(|t| tokenizer.token_to_id(t))
            .ok_or_else(|| {
                TtsError::Tokenizer(format!("no EOS token among {EOS_TOKENS:?} in vocabulary"))
            })?;
        let max_seq_len = max_seq_len.min(config.max_position_embeddings);
        debug!(
            max_seq_len,
            eos_token_id,
            dtype = ?dtype,
            "loaded Qwen2 speech model"
        );
        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            eos_token_id,
            max_seq_len,
        })
    }

    fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
        Tokenizer::from_file(path).map_err(|e| TtsError::Tokenizer(e.to_string()))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl SpeechLm for QwenLm {
    fn generate(&mut self, prompt: &str, params: &GenerationParams) -> Result<String> {
        // Each request starts from a clean KV cache; &mut self is what makes
        // unsynchronised sharing of one loaded instance a compile error.
        self.model.clear_kv_cache();

        let mut tokens = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| TtsError::Tokenizer(e.to_string()))?
            .get_ids()
            .to_vec();
        let prompt_len = tokens.len();
        if prompt_len >= self.max_seq_len {
            return Err(TtsError::ContextWindowExceeded {
                used: prompt_len,
                limit: self.max_seq_len,
            });
        }
        debug!(prompt_len, max_new_tokens = params.max_new_tokens, "decoding");

        let mut sampler = LogitsProcessor::from_sampling(params.seed, params.sampling());
        for index in 0..params.max_new_tokens {
            let context_size = if index > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len().saturating_sub(context_size);
            let input = Tensor::new(&tokens[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self.model.forward(&input, start_pos)?;
            let logits = logits.squeeze(0)?.squeeze(0)?.to_dtype(DType::F32)?;
            let next_token = sampler.sample(&logits)?;
            tokens.push(next_token);
            if next_token == self.eos_token_id {
                trace!(step = index, "eos reached");
                break;
            }
            if tokens.len() >= self.max_seq_len {
                return Err(TtsError::ContextWindowExceeded {
                    used: tokens.len(),
                    limit: self.max_seq_len,
                });
            }
        }

        // Trim the prompt echo by token count, not by text length, then
        // decode keeping special tokens for the parser.
        let generated = &tokens[prompt_len..];
        debug!(generated = generated.len(), "decode loop finished");
        self.tokenizer
            .decode(generated, false)
            .map_err(|e| TtsError::Tokenizer(e.to_string()))
    }
}
