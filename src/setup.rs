//! Model provisioning: device selection and resolution of language model,
//! tokenizer and codec assets from the Hugging Face Hub or a local
//! directory. Downloads land in the hub cache on first use and are reused
//! afterwards.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use candle_core::Device;
use hf_hub::api::sync::{Api, ApiRepo};
use tracing::info;

use crate::codec::BiCodec;
use crate::config::Settings;
use crate::error::{Result, TtsError};
use crate::generation::QwenLm;
use crate::tts::BambaraTts;

const WEIGHTS_INDEX: &str = "model.safetensors.index.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Resolved language-model asset paths.
#[derive(Debug, Clone)]
pub struct LmAssets {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: Vec<PathBuf>,
}

/// Resolved codec asset paths.
#[derive(Debug, Clone)]
pub struct CodecAssets {
    pub graph: PathBuf,
    pub config: Option<PathBuf>,
}

/// Pick the compute device: CUDA, then Metal, then CPU.
pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        return Ok(Device::Cpu);
    }
    if candle_core::utils::cuda_is_available() {
        info!("using CUDA device");
        Ok(Device::new_cuda(0)?)
    } else if candle_core::utils::metal_is_available() {
        info!("using Metal device");
        Ok(Device::new_metal(0)?)
    } else {
        info!("no GPU available, running on CPU");
        Ok(Device::Cpu)
    }
}

/// Resolve the language model from a local directory or a Hub repository.
pub fn fetch_lm(repo_or_path: &str) -> Result<LmAssets> {
    let local = Path::new(repo_or_path);
    if local.is_dir() {
        info!(path = %local.display(), "using local language model");
        return Ok(LmAssets {
            config: local.join("config.json"),
            tokenizer: local.join("tokenizer.json"),
            weights: local_safetensors(local)?,
        });
    }

    info!(repo = repo_or_path, "fetching language model from the hub");
    let api = Api::new()?;
    let repo = api.model(repo_or_path.to_string());
    let config = repo.get("config.json")?;
    let tokenizer = repo.get("tokenizer.json")?;
    let weights = match repo.get(WEIGHTS_INDEX) {
        Ok(index) => hub_sharded_safetensors(&repo, &index)?,
        Err(_) => vec![repo.get(WEIGHTS_FILE)?],
    };
    Ok(LmAssets {
        config,
        tokenizer,
        weights,
    })
}

/// Resolve the codec detokenizer graph (and optional config) from a local
/// directory or a Hub repository, downloading on first use.
pub fn fetch_codec(settings: &Settings) -> Result<CodecAssets> {
    let local = Path::new(&settings.codec_repo);
    if local.is_dir() {
        info!(path = %local.display(), "using local codec");
        let graph = local.join(&settings.codec_graph_file);
        if !graph.is_file() {
            return Err(TtsError::Resource(format!(
                "codec graph {} not found",
                graph.display()
            )));
        }
        let config = Some(local.join(&settings.codec_config_file)).filter(|p| p.is_file());
        return Ok(CodecAssets { graph, config });
    }

    info!(repo = %settings.codec_repo, "fetching codec from the hub");
    let api = Api::new()?;
    let repo = api.model(settings.codec_repo.clone());
    let graph = repo.get(&settings.codec_graph_file)?;
    let config = repo.get(&settings.codec_config_file).ok();
    Ok(CodecAssets { graph, config })
}

/// Load the full pipeline described by `settings` onto `device`.
pub fn load(settings: &Settings, device: &Device) -> Result<BambaraTts<QwenLm, BiCodec>> {
    let lm_assets = fetch_lm(&settings.model_repo)?;
    let lm = QwenLm::load(&lm_assets, settings.max_seq_length, device)?;

    let codec_assets = fetch_codec(settings)?;
    let sample_rate = codec_assets
        .config
        .as_deref()
        .and_then(BiCodec::sample_rate_from_config);
    let codec = BiCodec::load(&codec_assets.graph, sample_rate, device)?;

    Ok(BambaraTts::new(lm, codec))
}

fn local_safetensors(dir: &Path) -> Result<Vec<PathBuf>> {
    let index = dir.join(WEIGHTS_INDEX);
    if index.is_file() {
        let shards = sharded_file_names(&index)?;
        return Ok(shards.into_iter().map(|f| dir.join(f)).collect());
    }
    let single = dir.join(WEIGHTS_FILE);
    if single.is_file() {
        return Ok(vec![single]);
    }
    Err(TtsError::Resource(format!(
        "no safetensors weights in {}",
        dir.display()
    )))
}

fn hub_sharded_safetensors(repo: &ApiRepo, index: &Path) -> Result<Vec<PathBuf>> {
    sharded_file_names(index)?
        .into_iter()
        .map(|f| repo.get(&f).map_err(TtsError::from))
        .collect()
}

/// Read the distinct shard file names out of a safetensors index.
fn sharded_file_names(index: &Path) -> Result<Vec<String>> {
    let json: serde_json::Value = serde_json::from_reader(File::open(index)?)?;
    let weight_map = json
        .get("weight_map")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            TtsError::Resource(format!("no weight_map in {}", index.display()))
        })?;
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for value in weight_map.values() {
        if let Some(file) = value.as_str()
            && seen.insert(file)
        {
            files.push(file.to_string());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sharded_index_yields_unique_files_in_order() {
        let dir = std::env::temp_dir().join(format!("bambara-tts-idx-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let index = dir.join(WEIGHTS_INDEX);
        let mut f = File::create(&index).unwrap();
        write!(
            f,
            r#"{{"weight_map": {{
                "a": "model-00001-of-00002.safetensors",
                "b": "model-00001-of-00002.safetensors",
                "c": "model-00002-of-00002.safetensors"
            }}}}"#
        )
        .unwrap();
        let mut files = sharded_file_names(&index).unwrap();
        files.sort();
        assert_eq!(
            files,
            vec![
                "model-00001-of-00002.safetensors".to_string(),
                "model-00002-of-00002.safetensors".to_string()
            ]
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}
