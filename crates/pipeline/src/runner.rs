//! One video-generation run, stage by stage.

use std::path::{Path, PathBuf};

use shortsmith_common::config::{AppConfig, ScriptLength};
use shortsmith_common::error::{ShortsError, ShortsResult, Stage};
use shortsmith_common::naming::safe_name;
use shortsmith_narration::subtitles::{cues_from_phrases, save_subtitles};
use shortsmith_narration::synthesizer::{narration_path, NarrationSynthesizer, VoiceParams};
use shortsmith_processing_core::captions::{group_phrases, CaptionSynchronizer, SyncConfig};
use shortsmith_processing_core::layout::{place, LayoutConfig, LayoutEngine};
use shortsmith_processing_core::script::{
    parse_features, ComposerConfig, ScriptComposer, ScriptRequest, TemplateFamily,
};
use shortsmith_processing_core::timeline::{TimelineComposer, TimelineConfig};
use shortsmith_project_model::assets::{asset_label, AssetSet};
use shortsmith_project_model::geometry::Dimensions;
use shortsmith_project_model::history::{RunLedger, RunRecord, RunStatus};
use shortsmith_project_model::layout::{LayoutPlan, VideoMode};
use shortsmith_project_model::narration::{NarrationTrack, WordTiming};
use shortsmith_project_model::script::{Script, WordBand};
use shortsmith_project_model::timeline::Timeline;
use shortsmith_render_engine::backend::{ProgressCallback, RenderBackend};

use crate::assets::AssetProvider;
use crate::error::{AtStage, PipelineError, PipelineResult};

/// Where the narration text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptInput {
    /// Generate from templates and a comma-separated feature list.
    Generate { features: String },
    /// Use this text verbatim.
    Text(String),
    /// Read the text from a file.
    File(PathBuf),
}

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub game_name: String,
    pub steam_url: Option<String>,
    pub script: ScriptInput,
    pub mode: VideoMode,
    pub length: ScriptLength,
    /// Gameplay start offset; the configured default when `None`.
    pub video_start_secs: Option<f64>,
    /// Output directory; the configured one when `None`.
    pub output_dir: Option<PathBuf>,
    /// Extension of the rendered file.
    pub output_extension: String,
    /// Also write an SRT of the caption phrases next to the output.
    pub write_subtitles: bool,
}

impl RunRequest {
    pub fn new(game_name: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            steam_url: None,
            script: ScriptInput::Generate {
                features: String::new(),
            },
            mode: VideoMode::Standard,
            length: ScriptLength::Short,
            video_start_secs: None,
            output_dir: None,
            output_extension: "mp4".to_string(),
            write_subtitles: false,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: PathBuf,
    pub subtitles: Option<PathBuf>,
    pub script: Script,
    pub narration: NarrationTrack,
    pub timings: Vec<WordTiming>,
    pub timeline: Timeline,
    /// Non-fatal problems (script length outside its band).
    pub warnings: Vec<String>,
}

/// `<safe_name>[_<mode>].<extension>`; the suffix is omitted for standard.
pub fn output_file_name(safe_name: &str, mode: VideoMode, extension: &str) -> String {
    match mode.file_suffix() {
        Some(suffix) => format!("{safe_name}_{suffix}.{extension}"),
        None => format!("{safe_name}.{extension}"),
    }
}

/// Filesystem name for a game, never empty.
fn file_stem_for(game_name: &str) -> String {
    let name = safe_name(game_name);
    if name.is_empty() {
        "video".to_string()
    } else {
        name
    }
}

/// Runs the stages in order with injected synthesizer and renderer.
///
/// Stages run strictly one after another; the first fatal error stops the
/// run and is reported with its stage.
pub struct Pipeline {
    config: AppConfig,
    synthesizer: Box<dyn NarrationSynthesizer>,
    renderer: Box<dyn RenderBackend>,
    progress: Option<ProgressCallback>,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        synthesizer: Box<dyn NarrationSynthesizer>,
        renderer: Box<dyn RenderBackend>,
    ) -> Self {
        Self {
            config,
            synthesizer,
            renderer,
            progress: None,
        }
    }

    /// Report render progress for the next run.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Execute one run and append exactly one record to `ledger`.
    pub fn run(
        &mut self,
        request: &RunRequest,
        assets: &dyn AssetProvider,
        ledger: &mut dyn RunLedger,
    ) -> PipelineResult<RunOutcome> {
        let started = std::time::Instant::now();
        tracing::info!(
            game = %request.game_name,
            mode = %request.mode,
            renderer = self.renderer.name(),
            synthesizer = self.synthesizer.name(),
            "Starting run"
        );

        let result = self.execute(request, assets);
        let safe = file_stem_for(&request.game_name);
        let record = match &result {
            Ok(outcome) => {
                tracing::info!(
                    output = %outcome.output.display(),
                    duration_secs = outcome.narration.duration_secs(),
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Run complete"
                );
                RunRecord {
                    game_name: request.game_name.clone(),
                    safe_name: safe,
                    steam_url: request.steam_url.clone(),
                    mode: request.mode,
                    status: RunStatus::Completed,
                    output: Some(outcome.output.clone()),
                    failed_stage: None,
                    message: None,
                    word_count: Some(outcome.script.word_count()),
                    duration_secs: Some(outcome.narration.duration_secs()),
                    recorded_at: chrono::Utc::now().to_rfc3339(),
                }
            }
            Err(err) => {
                tracing::error!(stage = %err.stage, error = %err.source, "Run failed");
                RunRecord {
                    game_name: request.game_name.clone(),
                    safe_name: safe,
                    steam_url: request.steam_url.clone(),
                    mode: request.mode,
                    status: RunStatus::Failed,
                    output: None,
                    failed_stage: Some(err.stage),
                    message: Some(err.source.to_string()),
                    word_count: None,
                    duration_secs: None,
                    recorded_at: chrono::Utc::now().to_rfc3339(),
                }
            }
        };
        ledger.append(record);
        result
    }

    fn execute(
        &mut self,
        request: &RunRequest,
        assets: &dyn AssetProvider,
    ) -> PipelineResult<RunOutcome> {
        let safe = file_stem_for(&request.game_name);
        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.output_dir.clone());
        let output = output_dir.join(output_file_name(
            &safe,
            request.mode,
            &request.output_extension,
        ));

        let assets = assets.provide().at(Stage::Assets)?;

        let mut warnings = Vec::new();
        let script = self.compose_script(request, &mut warnings)?;

        let narration = self.narrate(&script, &safe)?;

        let timings = CaptionSynchronizer::new(SyncConfig::from(&self.config.captions))
            .synchronize(&script, &narration);
        tracing::info!(words = timings.len(), "Caption timings computed");

        let plan = self.layout(request.mode, &assets)?;

        let video_start = request
            .video_start_secs
            .unwrap_or(self.config.timeline.video_start_secs);
        let timeline = TimelineComposer::new(TimelineConfig::from(&self.config))
            .compose(&assets, &plan, &narration, &timings, video_start)
            .at(Stage::Timeline)?;

        tracing::info!(renderer = self.renderer.name(), output = %output.display(), "Rendering");
        let output = self
            .renderer
            .render(&timeline, &output, self.progress.take())
            .at(Stage::Render)?;

        // Only a finished video gets a subtitle file next to it.
        let subtitles = if request.write_subtitles {
            Some(self.write_subtitles(&timings, &output)?)
        } else {
            None
        };

        Ok(RunOutcome {
            output,
            subtitles,
            script,
            narration,
            timings,
            timeline,
            warnings,
        })
    }

    fn compose_script(
        &self,
        request: &RunRequest,
        warnings: &mut Vec<String>,
    ) -> PipelineResult<Script> {
        let (supplied, features) = match &request.script {
            ScriptInput::Generate { features } => (None, parse_features(features)),
            ScriptInput::Text(text) => (Some(text.clone()), Vec::new()),
            ScriptInput::File(path) => {
                let text = read_script_file(path).at(Stage::Script)?;
                (Some(text), Vec::new())
            }
        };

        let composer = ScriptComposer::new(ComposerConfig {
            max_features: self.config.script.max_features,
            words_per_minute: self.config.tts.words_per_minute,
        });
        let composed = composer.compose(&ScriptRequest {
            game_name: &request.game_name,
            features: &features,
            supplied: supplied.as_deref(),
            family: TemplateFamily::for_mode(request.mode),
            band: WordBand::for_length(request.length),
        });

        if composed.script.is_empty() {
            return Err(PipelineError::new(
                Stage::Script,
                ShortsError::synthesis("Script has no words to speak"),
            ));
        }
        if let Some(warning) = composed.warning {
            tracing::warn!(%warning, "Script length outside target band");
            warnings.push(warning.to_string());
        }
        tracing::info!(
            words = composed.script.word_count(),
            source = ?composed.script.source(),
            estimated_secs = composed.script.estimated_duration_secs(),
            "Script ready"
        );
        Ok(composed.script)
    }

    fn narrate(&mut self, script: &Script, safe: &str) -> PipelineResult<NarrationTrack> {
        let path = narration_path(&self.config.temp_dir, safe);
        let voice = VoiceParams::from(&self.config.tts);
        let track = self
            .synthesizer
            .synthesize(script.text(), &voice, &path)
            .at(Stage::Narration)?;
        tracing::info!(
            duration_secs = track.duration_secs(),
            estimated_secs = script.estimated_duration_secs(),
            "Narration measured"
        );
        Ok(track)
    }

    fn write_subtitles(&self, timings: &[WordTiming], output: &Path) -> PipelineResult<PathBuf> {
        let phrases = group_phrases(
            timings,
            self.config.captions.max_words_per_phrase,
            self.config.captions.max_chars_per_phrase,
        );
        let path = output.with_extension("srt");
        save_subtitles(&cues_from_phrases(&phrases), &path).at(Stage::Captions)?;
        Ok(path)
    }

    /// Plan the bands and check every asset can be placed in its band.
    fn layout(&self, mode: VideoMode, assets: &AssetSet) -> PipelineResult<LayoutPlan> {
        let canvas = Dimensions::new(self.config.video.width, self.config.video.height);
        let plan = LayoutEngine::new(canvas, LayoutConfig::default()).plan(mode);
        let strategy = mode.fit_strategy();

        if let Some(band) = plan.image_band() {
            for image in &assets.images {
                place(image.dimensions, band, strategy, &asset_label(&image.path))
                    .at(Stage::Layout)?;
            }
        }
        if let (Some(band), Some(video)) = (plan.video_band(), assets.video.as_ref()) {
            place(video.dimensions, band, strategy, &asset_label(&video.path)).at(Stage::Layout)?;
        }

        tracing::info!(mode = %mode, bands = plan.bands.len(), "Layout planned");
        Ok(plan)
    }
}

/// Script text from disk; a missing file is reported as `FileNotFound`.
pub(crate) fn read_script_file(path: &Path) -> ShortsResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ShortsError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ShortsError::Io(e),
    })
}
