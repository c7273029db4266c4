//! Compute caption timings and export them as SRT/VTT.

use std::path::PathBuf;

use anyhow::Context;
use shortsmith_common::config::AppConfig;
use shortsmith_narration::subtitles::{
    cues_from_phrases, cues_from_words, generate_srt, save_subtitles,
};
use shortsmith_processing_core::captions::{group_phrases, CaptionSynchronizer, SyncConfig};
use shortsmith_project_model::narration::NarrationTrack;
use shortsmith_project_model::script::{Script, ScriptSource, WordBand};

pub fn run(
    config: &AppConfig,
    script: Option<String>,
    script_file: Option<PathBuf>,
    duration: f64,
    output: Option<PathBuf>,
    phrases: bool,
) -> anyhow::Result<()> {
    let text = match (script, script_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Pass --script or --script-file"),
    };

    let script = Script::new(
        &text,
        WordBand::SHORT,
        ScriptSource::UserProvided,
        config.tts.words_per_minute,
    );
    let narration = NarrationTrack::new("narration.wav", duration)?;
    let timings = CaptionSynchronizer::new(SyncConfig::from(&config.captions))
        .synchronize(&script, &narration);

    let cues = if phrases {
        cues_from_phrases(&group_phrases(
            &timings,
            config.captions.max_words_per_phrase,
            config.captions.max_chars_per_phrase,
        ))
    } else {
        cues_from_words(&timings)
    };

    match output {
        Some(path) => {
            save_subtitles(&cues, &path)?;
            println!("Wrote {} cues to {}", cues.len(), path.display());
        }
        None => print!("{}", generate_srt(&cues)),
    }
    Ok(())
}
