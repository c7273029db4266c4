//! Preview a generated script.

use shortsmith_common::config::{AppConfig, ScriptLength};
use shortsmith_processing_core::script::{
    parse_features, ComposerConfig, ScriptComposer, ScriptRequest, TemplateFamily,
};
use shortsmith_project_model::layout::VideoMode;
use shortsmith_project_model::script::WordBand;

pub fn run(
    config: &AppConfig,
    game: &str,
    features: &str,
    context: bool,
    mode: VideoMode,
) -> anyhow::Result<()> {
    let length = if context {
        ScriptLength::Context
    } else {
        ScriptLength::Short
    };
    let band = WordBand::for_length(length);
    let features = parse_features(features);

    let composer = ScriptComposer::new(ComposerConfig {
        max_features: config.script.max_features,
        words_per_minute: config.tts.words_per_minute,
    });
    let composed = composer.compose(&ScriptRequest {
        game_name: game,
        features: &features,
        supplied: None,
        family: TemplateFamily::for_mode(mode),
        band,
    });
    let script = &composed.script;

    println!("{}", script.text());
    println!();
    println!("Words: {} (target {}-{})", script.word_count(), band.min, band.max);
    println!(
        "Estimated duration: {:.1}s at {} wpm",
        script.estimated_duration_secs(),
        script.words_per_minute()
    );
    if let Some(warning) = composed.warning {
        println!("Warning: {warning}");
    }
    Ok(())
}
