//! Facade-level tests of the inference pipeline over stub collaborators.

use std::cell::RefCell;
use std::path::PathBuf;

use bambara_tts::{
    AudioTokenizer, BambaraTts, Device, GenerationParams, Result, Speaker, SpeechLm, Tensor,
    TtsError, audio,
};

/// Language model stub that replays a fixed token text and records calls.
struct ScriptedLm {
    output: String,
    calls: usize,
    last_prompt: Option<String>,
}

impl ScriptedLm {
    fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: 0,
            last_prompt: None,
        }
    }
}

impl SpeechLm for ScriptedLm {
    fn generate(&mut self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.calls += 1;
        self.last_prompt = Some(prompt.to_string());
        Ok(self.output.clone())
    }
}

/// Codec stub that records the tensors it is handed and fabricates a
/// waveform of `samples_per_token` samples per semantic token.
struct ProbeCodec {
    device: Device,
    sample_rate: u32,
    samples_per_token: usize,
    calls: RefCell<usize>,
    seen: RefCell<Option<(Vec<usize>, Vec<usize>, Vec<Vec<i64>>)>>,
}

impl ProbeCodec {
    fn new(sample_rate: u32, samples_per_token: usize) -> Self {
        Self {
            device: Device::Cpu,
            sample_rate,
            samples_per_token,
            calls: RefCell::new(0),
            seen: RefCell::new(None),
        }
    }
}

impl AudioTokenizer for ProbeCodec {
    fn detokenize(&self, global_ids: &Tensor, semantic_ids: &Tensor) -> Result<Vec<f32>> {
        *self.calls.borrow_mut() += 1;
        let semantic = semantic_ids.to_vec2::<i64>()?;
        *self.seen.borrow_mut() = Some((
            global_ids.dims().to_vec(),
            semantic_ids.dims().to_vec(),
            semantic.clone(),
        ));
        let n = semantic[0].len();
        Ok(vec![0.1; n * self.samples_per_token])
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bambara-tts-{}-{}", std::process::id(), name))
}

#[test]
fn empty_text_fails_before_any_generation() {
    let mut tts = BambaraTts::new(ScriptedLm::new("ignored"), ProbeCodec::new(16_000, 320));
    let err = tts
        .generate_speech("", None, &GenerationParams::default(), None)
        .unwrap_err();
    assert!(matches!(err, TtsError::EmptyText));
    assert!(err.is_input_error());
}

#[test]
fn empty_text_does_not_invoke_the_language_model() {
    let mut tts = BambaraTts::new(ScriptedLm::new("ignored"), ProbeCodec::new(16_000, 320));
    let _ = tts.generate_speech("", Some(&Speaker::ADAME), &GenerationParams::default(), None);
    assert_eq!(tts.lm().calls, 0);
    assert_eq!(*tts.codec().calls.borrow(), 0);
}

#[test]
fn speaker_prefix_and_control_tokens_reach_the_model() {
    let mut tts = BambaraTts::new(ScriptedLm::new(""), ProbeCodec::new(16_000, 320));
    tts.generate_speech(
        "aw ni ce",
        Some(&Speaker::ADAME),
        &GenerationParams::default(),
        None,
    )
    .unwrap();
    let prompt = tts.lm().last_prompt.clone().unwrap();
    assert_eq!(
        prompt,
        "<|task_tts|><|start_content|>SPEAKER_1: aw ni ce<|end_content|><|start_global_token|>"
    );
}

#[test]
fn parsed_ids_reach_the_codec_with_the_contract_shapes() {
    let lm = ScriptedLm::new("<|bicodec_semantic_12|><|bicodec_semantic_45|>");
    let codec = ProbeCodec::new(16_000, 320);
    let mut tts = BambaraTts::new(lm, codec);
    let wav = tts
        .generate_speech(
            "aw ni ce",
            Some(&Speaker::ADAME),
            &GenerationParams::default(),
            None,
        )
        .unwrap();
    assert_eq!(wav.len(), 2 * 320);

    let codec = tts.codec();
    let (global_dims, semantic_dims, semantic_vals) = codec.seen.borrow().clone().unwrap();
    // Semantic rank-2 (1, N); global rank-3 (1, 1, M) with the [0] default.
    assert_eq!(semantic_dims, vec![1, 2]);
    assert_eq!(global_dims, vec![1, 1, 1]);
    assert_eq!(semantic_vals, vec![vec![12, 45]]);
}

#[test]
fn stream_without_semantic_markers_yields_empty_result_and_no_file() {
    let lm = ScriptedLm::new("<|bicodec_global_3|> nothing else <|im_end|>");
    let codec = ProbeCodec::new(16_000, 320);
    let mut tts = BambaraTts::new(lm, codec);
    let out = scratch_path("silent.wav");
    let wav = tts
        .generate_speech(
            "aw ni ce",
            None,
            &GenerationParams::default(),
            Some(&out),
        )
        .unwrap();
    assert!(wav.is_empty());
    assert!(!out.exists(), "no file may be written for an empty result");
    assert_eq!(*tts.codec().calls.borrow(), 0);
}

#[test]
fn non_empty_waveform_is_persisted_at_the_codec_rate() {
    let lm = ScriptedLm::new("<|bicodec_semantic_1|><|bicodec_semantic_2|><|bicodec_semantic_3|>");
    let codec = ProbeCodec::new(22_050, 160);
    let mut tts = BambaraTts::new(lm, codec);
    let out = scratch_path("voiced.wav");
    let wav = tts
        .generate_speech(
            "i ni sɔgɔma",
            Some(&Speaker::SEYDOU),
            &GenerationParams::default(),
            Some(&out),
        )
        .unwrap();
    assert_eq!(wav.len(), 3 * 160);

    let (persisted, rate) = audio::read_pcm_from_wav(&out).unwrap();
    assert_eq!(persisted.len(), wav.len());
    assert_eq!(rate, 22_050);
    std::fs::remove_file(&out).ok();
}
