//! BiCodec detokenization: discrete identifier sequences back to a waveform.
//!
//! The codec is an opaque collaborator behind [`AudioTokenizer`]; this
//! module owns the tensor packaging contract and the short-circuit for the
//! empty terminal case. The concrete [`BiCodec`] evaluates an exported ONNX
//! graph of the detokenizer.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_onnx::onnx::ModelProto;
use tracing::debug;

use crate::config::DEFAULT_SAMPLE_RATE;
use crate::error::{Result, TtsError};
use crate::parser::CodecIds;

/// Narrow contract with the audio codec.
///
/// Shape contract (the detokenizer graph is shape-sensitive): `global_ids`
/// arrives as rank-3 `(1, 1, M)` and `semantic_ids` as rank-2 `(1, N)`, both
/// `i64` and already on [`AudioTokenizer::device`].
pub trait AudioTokenizer {
    fn detokenize(&self, global_ids: &Tensor, semantic_ids: &Tensor) -> Result<Vec<f32>>;

    /// Declared output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// The compute device the codec was bound to at construction. Device
    /// binding happens once at load time, never per call.
    fn device(&self) -> &Device;
}

/// Package parsed identifiers into codec tensors and detokenize.
///
/// An empty semantic sequence yields an empty waveform without touching the
/// codec — a deliberate short-circuit, not an error.
pub fn synthesize<C: AudioTokenizer + ?Sized>(codec: &C, ids: &CodecIds) -> Result<Vec<f32>> {
    if ids.is_empty() {
        debug!("no semantic ids; skipping synthesis");
        return Ok(Vec::new());
    }
    let device = codec.device();
    let semantic = Tensor::from_slice(&ids.semantic, (1, ids.semantic.len()), device)?;
    let global = Tensor::from_slice(&ids.global, (1, 1, ids.global.len()), device)?;
    debug!(
        semantic = ids.semantic.len(),
        global = ids.global.len(),
        "detokenizing"
    );
    codec.detokenize(&global, &semantic)
}

/// BiCodec detokenizer evaluated from an exported ONNX graph.
pub struct BiCodec {
    graph: ModelProto,
    global_input: String,
    semantic_input: String,
    output: String,
    sample_rate: u32,
    device: Device,
}

impl BiCodec {
    /// Load the detokenizer graph, resolving its input bindings by name.
    ///
    /// The export is expected to take two inputs — one for global tokens,
    /// one for semantic tokens — distinguished by their names; when the
    /// names carry no hint, graph declaration order decides (global first,
    /// matching the detokenize signature).
    pub fn load(graph_path: &Path, sample_rate: Option<u32>, device: &Device) -> Result<Self> {
        let graph = candle_onnx::read_file(graph_path)?;
        let proto = graph
            .graph
            .as_ref()
            .ok_or_else(|| TtsError::Codec("onnx file has no graph".to_string()))?;
        if proto.input.len() != 2 {
            return Err(TtsError::Codec(format!(
                "expected 2 graph inputs (global, semantic), found {}",
                proto.input.len()
            )));
        }
        let names: Vec<String> = proto.input.iter().map(|i| i.name.clone()).collect();
        let (global_input, semantic_input) = if names[0].contains("semantic") {
            (names[1].clone(), names[0].clone())
        } else {
            (names[0].clone(), names[1].clone())
        };
        let output = proto
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| TtsError::Codec("onnx graph has no output".to_string()))?;
        let sample_rate = sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        debug!(
            %global_input,
            %semantic_input,
            %output,
            sample_rate,
            "loaded BiCodec graph"
        );
        Ok(Self {
            graph,
            global_input,
            semantic_input,
            output,
            sample_rate,
            device: device.clone(),
        })
    }

    /// Read `sample_rate` from a codec `config.json`, if the file and the
    /// key exist.
    pub fn sample_rate_from_config(path: &Path) -> Option<u32> {
        let txt = std::fs::read_to_string(path).ok()?;
        let value: serde_json::Value = serde_json::from_str(&txt).ok()?;
        value.get("sample_rate")?.as_u64().map(|v| v as u32)
    }
}

impl AudioTokenizer for BiCodec {
    fn detokenize(&self, global_ids: &Tensor, semantic_ids: &Tensor) -> Result<Vec<f32>> {
        let mut inputs = HashMap::new();
        inputs.insert(self.global_input.clone(), global_ids.clone());
        inputs.insert(self.semantic_input.clone(), semantic_ids.clone());
        let mut outputs = candle_onnx::simple_eval(&self.graph, inputs)?;
        let wav = outputs
            .remove(&self.output)
            .ok_or_else(|| TtsError::Codec(format!("graph produced no '{}' output", self.output)))?;
        Ok(wav.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
