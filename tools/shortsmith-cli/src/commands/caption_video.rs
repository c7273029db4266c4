//! Burn word-highlight captions into an existing video.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use shortsmith_common::config::AppConfig;
use shortsmith_pipeline::{caption_video, CaptionVideoRequest, FfprobeProbe, ScriptInput};
use shortsmith_render_engine::backend::{ProgressCallback, RenderProgress, RenderSettings};
use shortsmith_render_engine::burn::CaptionBurner;
use shortsmith_render_engine::FfmpegBackend;

pub async fn run(
    config: AppConfig,
    video: PathBuf,
    script: Option<String>,
    script_file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let script = match (script, script_file) {
        (Some(text), _) => ScriptInput::Text(text),
        (None, Some(path)) => ScriptInput::File(path),
        (None, None) => anyhow::bail!("Pass --script or --script-file"),
    };

    let mut burner = FfmpegBackend::new(RenderSettings::from(&config));
    if !burner.is_available() {
        anyhow::bail!("ffmpeg not found on PATH");
    }

    let request = CaptionVideoRequest {
        video,
        script,
        output,
    };
    println!("Captioning: {}", request.video.display());
    println!("  Output: {}", request.output_path().display());

    let progress_cb: ProgressCallback = Box::new(|p: RenderProgress| {
        print!("\r  Progress: {:.1}% (ETA: {:.0}s)  ", p.progress * 100.0, p.eta_secs);
        let _ = std::io::stdout().flush();
    });

    let result = tokio::task::spawn_blocking(move || {
        caption_video(&config, &request, &FfprobeProbe, &mut burner, Some(progress_cb))
    })
    .await
    .context("caption task panicked")?;
    println!();

    let done = result.context("Captioning failed")?;
    println!(
        "  Captions: {} words over {:.1}s",
        done.timings.len(),
        done.duration_secs
    );
    println!("\nDone: {}", done.output.display());
    Ok(())
}
