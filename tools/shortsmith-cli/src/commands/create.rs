//! Build a video for one game.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use shortsmith_common::config::{AppConfig, ScriptLength};
use shortsmith_narration::synthesizer::{
    CommandSynthesizer, NarrationSynthesizer, SilentSynthesizer,
};
use shortsmith_pipeline::{DirectoryAssetProvider, Pipeline, RunRequest, ScriptInput};
use shortsmith_project_model::history::{RunHistory, RunLedger};
use shortsmith_project_model::layout::VideoMode;
use shortsmith_render_engine::backend::{
    ProgressCallback, RenderBackend, RenderProgress, RenderSettings,
};
use shortsmith_render_engine::{FfmpegBackend, TimelineJsonBackend};

pub struct CreateArgs {
    pub game: String,
    pub images: PathBuf,
    pub video: PathBuf,
    pub steam_url: Option<String>,
    pub features: String,
    pub script: Option<String>,
    pub script_file: Option<PathBuf>,
    pub mode: VideoMode,
    pub start: Option<f64>,
    pub output: Option<PathBuf>,
    pub context: bool,
    pub silent_narration: bool,
    pub dry_run: bool,
    pub subtitles: bool,
}

fn synthesizer(config: &AppConfig, silent: bool) -> anyhow::Result<Box<dyn NarrationSynthesizer>> {
    if silent {
        return Ok(Box::new(SilentSynthesizer::new()));
    }
    let command = CommandSynthesizer::from_config(&config.tts);
    if !command.is_available() {
        anyhow::bail!(
            "TTS program '{}' not found. Install it, set tts.command in the config, or pass --silent-narration",
            command.program()
        );
    }
    Ok(Box::new(command))
}

fn renderer(config: &AppConfig, dry_run: bool) -> anyhow::Result<Box<dyn RenderBackend>> {
    if dry_run {
        return Ok(Box::new(TimelineJsonBackend::new()));
    }
    let ffmpeg = FfmpegBackend::new(RenderSettings::from(config));
    if !ffmpeg.is_available() {
        anyhow::bail!("ffmpeg not found on PATH. Install it or pass --dry-run");
    }
    Ok(Box::new(ffmpeg))
}

pub async fn run(config: AppConfig, args: CreateArgs) -> anyhow::Result<()> {
    println!("Creating video for: {}", args.game);

    let script = match (args.script, args.script_file) {
        (Some(text), _) => ScriptInput::Text(text),
        (None, Some(path)) => ScriptInput::File(path),
        (None, None) => ScriptInput::Generate {
            features: args.features,
        },
    };

    let mut request = RunRequest::new(args.game);
    request.steam_url = args.steam_url;
    request.script = script;
    request.mode = args.mode;
    request.length = if args.context {
        ScriptLength::Context
    } else {
        ScriptLength::Short
    };
    request.video_start_secs = args.start;
    request.output_dir = args.output;
    request.write_subtitles = args.subtitles;
    if args.dry_run {
        request.output_extension = "timeline.json".to_string();
    }

    println!("  Mode: {}", request.mode);
    println!("  Images: {}", args.images.display());
    println!("  Video: {}", args.video.display());

    let synthesizer = synthesizer(&config, args.silent_narration || args.dry_run)?;
    let renderer = renderer(&config, args.dry_run)?;
    let provider = DirectoryAssetProvider::new(args.images, args.video, config.assets.clone());

    let progress_cb: ProgressCallback = Box::new(|p: RenderProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let (result, history) = tokio::task::spawn_blocking(move || {
        let mut history = RunHistory::new();
        let mut pipeline = Pipeline::new(config, synthesizer, renderer).with_progress(progress_cb);
        let result = pipeline.run(&request, &provider, &mut history);
        (result, history)
    })
    .await
    .context("pipeline task panicked")?;

    if let Some(record) = history.records().last() {
        tracing::debug!(record = %serde_json::to_string(record)?, "Run recorded");
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            println!();
            return Err(anyhow::Error::new(err).context("Video creation failed"));
        }
    };

    println!();
    for warning in &outcome.warnings {
        println!("  Warning: {warning}");
    }
    println!(
        "  Script: {} words ({:?})",
        outcome.script.word_count(),
        outcome.script.source()
    );
    println!("  Narration: {:.1}s", outcome.narration.duration_secs());
    println!("  Segments: {}", outcome.timeline.segments.len());
    if let Some(subtitles) = &outcome.subtitles {
        println!("  Subtitles: {}", subtitles.display());
    }
    println!("\nDone: {}", outcome.output.display());
    Ok(())
}
