use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Sample rate used when the codec configuration does not declare one.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Static configuration for model resolution and generation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Language model repository id on the Hub, or a local directory.
    pub model_repo: String,
    /// Audio codec repository id on the Hub, or a local directory.
    pub codec_repo: String,
    /// File name of the exported BiCodec detokenizer graph inside the codec
    /// repository.
    pub codec_graph_file: String,
    /// File name of the codec configuration (read for `sample_rate`).
    pub codec_config_file: String,
    /// Hard cap on prompt plus generated tokens, clamped to the model's
    /// declared context length at load time.
    pub max_seq_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_repo: "sudoping01/bambara-tts-1-merged-16bit".to_string(),
            codec_repo: "unsloth/Spark-TTS-0.5B".to_string(),
            codec_graph_file: "bicodec.onnx".to_string(),
            codec_config_file: "config.json".to_string(),
            max_seq_length: 2048,
        }
    }
}

impl Settings {
    /// Load a JSON settings file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let txt = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    /// Save to disk (pretty-printed).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
