// bambara-tts reference CLI
//
//  ❯ cargo run --release -- --text "aw ni ce"
//  ❯ cargo run --release -- --text "i ni sɔgɔma" --speaker SPEAKER_3 --out sogoma.wav

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bambara_tts::{setup, GenerationParams, Settings, Speaker};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Bambara text to synthesize.
    #[arg(long)]
    text: Option<String>,

    /// Speaker id (e.g. SPEAKER_1) or display name (e.g. Adame).
    #[arg(long, default_value = "SPEAKER_1")]
    speaker: String,

    /// List registered speakers and exit.
    #[arg(long)]
    list_speakers: bool,

    /// Language model repository id or local directory.
    #[arg(long)]
    model: Option<String>,

    /// Codec repository id or local directory.
    #[arg(long)]
    codec: Option<String>,

    /// Force CPU execution (otherwise CUDA/Metal if available).
    #[arg(long)]
    cpu: bool,

    /// Sampling temperature (0.0 = greedy).
    #[arg(long, default_value_t = 0.8)]
    temperature: f64,

    /// Top-k sampling.
    #[arg(long, default_value_t = 50)]
    top_k: usize,

    /// Nucleus-sampling p.
    #[arg(long, default_value_t = 1.0)]
    top_p: f64,

    /// Maximum audio tokens to generate.
    #[arg(long, default_value_t = 2048)]
    max_new_tokens: usize,

    /// Sampling seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output WAV file.
    #[arg(long, default_value = "out.wav")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("bambara_tts=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();

    let args = Args::parse();

    if args.list_speakers {
        for speaker in Speaker::all() {
            println!("{}\t{}", speaker.id(), speaker.name());
        }
        return Ok(());
    }

    let text = args
        .text
        .ok_or_else(|| anyhow::anyhow!("--text is required (or use --list-speakers)"))?;

    // Accept either the raw id or a registered display name.
    let speaker = Speaker::new(&args.speaker).or_else(|_| Speaker::by_name(&args.speaker))?;

    let mut settings = Settings::default();
    if let Some(model) = args.model {
        settings.model_repo = model;
    }
    if let Some(codec) = args.codec {
        settings.codec_repo = codec;
    }

    let device = setup::device(args.cpu)?;
    let mut tts = setup::load(&settings, &device)?;

    let params = GenerationParams {
        temperature: args.temperature,
        top_k: args.top_k,
        top_p: args.top_p,
        max_new_tokens: args.max_new_tokens,
        seed: args.seed,
    };

    let start = std::time::Instant::now();
    let waveform = tts.generate_speech(&text, Some(&speaker), &params, Some(&args.out))?;
    if waveform.is_empty() {
        info!("model emitted no audio tokens; nothing written");
    } else {
        let seconds = waveform.len() as f64 / tts.sample_rate() as f64;
        info!(
            path = %args.out.display(),
            seconds = format!("{seconds:.2}"),
            elapsed = format!("{:.2}s", start.elapsed().as_secs_f64()),
            "done"
        );
    }
    Ok(())
}
