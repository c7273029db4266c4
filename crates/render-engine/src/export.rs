//! ffmpeg render backend.
//!
//! The whole timeline becomes one ffmpeg invocation: every image window and
//! gameplay slice is an input, fitted to its band and shifted to its start
//! time, then overlaid onto a solid background. Captions are drawn with a
//! pair of `drawtext` filters per word (plain and highlighted).

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::layout::Placement;
use shortsmith_project_model::timeline::{
    CaptionCue, KenBurns, Segment, SegmentContent, Timeline,
};

use crate::backend::{
    write_atomically, ProgressCallback, RenderBackend, RenderProgress, RenderSettings,
    RenderStage,
};
use crate::compositor::check_coverage;
use crate::probe::command_exists;

/// Everything needed to launch ffmpeg for one timeline.
#[derive(Debug, Clone)]
pub struct FfmpegPlan {
    pub args: Vec<String>,
    pub filter_graph: String,
    pub input_count: usize,
    pub total_frames: u64,
    pub expected_duration_secs: f64,
}

/// Renders timelines to H.264/AAC MP4 with the system ffmpeg.
pub struct FfmpegBackend {
    settings: RenderSettings,
    program: String,
}

impl FfmpegBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            program: "ffmpeg".to_string(),
        }
    }

    /// Use a different ffmpeg binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Build a plan against the partial output, run it, and rename the result
    /// into place. The filter graph file lives only for the ffmpeg run.
    pub(crate) fn execute<F>(
        &self,
        output: &Path,
        total_frames: u64,
        progress: Option<ProgressCallback>,
        build: F,
    ) -> ShortsResult<PathBuf>
    where
        F: FnOnce(&Path, &Path) -> ShortsResult<FfmpegPlan>,
    {
        let final_path = write_atomically(output, |temp| {
            let graph_path = temp.with_extension("filtergraph.txt");
            let plan = build(temp, &graph_path)?;

            if let Some(cb) = &progress {
                cb(RenderProgress {
                    progress: 0.0,
                    frames_rendered: 0,
                    total_frames: plan.total_frames,
                    eta_secs: 0.0,
                    stage: RenderStage::Preparing,
                });
            }

            std::fs::write(&graph_path, &plan.filter_graph)?;
            let result = self.run_ffmpeg(&plan, progress.as_ref());
            if let Err(e) = std::fs::remove_file(&graph_path) {
                tracing::debug!(error = %e, path = %graph_path.display(), "Could not remove filter graph");
            }
            result
        })?;

        if let Some(cb) = &progress {
            cb(RenderProgress {
                progress: 1.0,
                frames_rendered: total_frames,
                total_frames,
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }
        Ok(final_path)
    }

    fn run_ffmpeg(&self, plan: &FfmpegPlan, progress: Option<&ProgressCallback>) -> ShortsResult<()> {
        tracing::debug!(args = ?plan.args, "Running ffmpeg");
        let mut cmd = Command::new(&self.program);
        cmd.args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ShortsError::render(format!("Failed to start {}: {e}", self.program)))?;

        tracing::info!(
            pid = child.id(),
            inputs = plan.input_count,
            total_frames = plan.total_frames,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShortsError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ShortsError::render("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills up.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        let mut latest_progress = ProgressState::default();
        let mut last_progress_secs = 0.0f64;
        let mut last_progress_wall = std::time::Instant::now();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| ShortsError::render(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            latest_progress.update(key, value);
            if key != "progress" {
                continue;
            }

            if latest_progress.out_time_secs > last_progress_secs + 0.001 {
                last_progress_secs = latest_progress.out_time_secs;
                last_progress_wall = std::time::Instant::now();
            }
            if let Some(cb) = progress {
                cb(progress_report(
                    &latest_progress,
                    plan.total_frames,
                    plan.expected_duration_secs,
                    start.elapsed().as_secs_f64(),
                ));
            }
            if last_progress_wall.elapsed().as_secs() >= 10 {
                tracing::warn!(
                    out_time_secs = latest_progress.out_time_secs,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "No ffmpeg progress advancement for 10s"
                );
                last_progress_wall = std::time::Instant::now();
            }
        }

        let status = child
            .wait()
            .map_err(|e| ShortsError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(ShortsError::render(format!(
                "ffmpeg failed (status {}): {}",
                status,
                tail_lines(&stderr_output, 20)
            )));
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(
        &mut self,
        timeline: &Timeline,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> ShortsResult<PathBuf> {
        verify_sources(timeline)?;

        let coverage = check_coverage(timeline, u64::from(timeline.fps.max(1)));
        if !coverage.is_complete() {
            tracing::warn!(
                sampled = coverage.sampled_frames,
                without_image = coverage.frames_without_image,
                without_video = coverage.frames_without_video,
                without_highlight = coverage.frames_without_highlight,
                "Timeline leaves parts of the canvas empty"
            );
        }

        let final_path = self.execute(output, timeline.total_frames(), progress, |temp, graph| {
            build_plan(timeline, &self.settings, temp, graph)
        })?;

        tracing::info!(output = %final_path.display(), "Render complete");
        Ok(final_path)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.program)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Every file the timeline references must exist before ffmpeg starts.
fn verify_sources(timeline: &Timeline) -> ShortsResult<()> {
    for segment in &timeline.segments {
        let path = match &segment.content {
            SegmentContent::Image { path, .. }
            | SegmentContent::Video { path, .. }
            | SegmentContent::Narration { path } => path,
            _ => continue,
        };
        if !path.exists() {
            return Err(ShortsError::FileNotFound { path: path.clone() });
        }
    }
    Ok(())
}

/// Build the ffmpeg argument list and filter graph for `timeline`.
///
/// `graph_path` is where the caller will write `filter_graph`; it is
/// referenced from the arguments rather than inlined.
pub fn build_plan(
    timeline: &Timeline,
    settings: &RenderSettings,
    output: &Path,
    graph_path: &Path,
) -> ShortsResult<FfmpegPlan> {
    if timeline.duration_secs <= 0.0 {
        return Err(ShortsError::render("Timeline has no duration"));
    }
    if timeline.canvas.is_degenerate() {
        return Err(ShortsError::render("Timeline canvas has no area"));
    }

    let fps = timeline.fps.max(1);
    let total = timeline.duration_secs;
    let mut inputs: Vec<String> = Vec::new();
    let mut input_count = 0usize;
    let mut chains: Vec<String> = Vec::new();
    let mut captions: Vec<(&Segment, &CaptionCue)> = Vec::new();
    let mut audio_input = None;

    let background = timeline
        .segments
        .iter()
        .find_map(|s| match &s.content {
            SegmentContent::Fill { color } => Some(color.as_str()),
            _ => None,
        })
        .unwrap_or("black");
    chains.push(format!(
        "color=c={}:s={}x{}:r={fps}:d={total:.3}[base]",
        ffmpeg_color(background),
        timeline.canvas.width,
        timeline.canvas.height,
    ));
    let mut current = "base".to_string();

    for segment in &timeline.segments {
        let start = segment.start_secs;
        let duration = segment.duration_secs();
        match &segment.content {
            SegmentContent::Image {
                path,
                placement,
                motion,
            } => {
                if duration <= 0.0 {
                    continue;
                }
                inputs.extend([
                    "-loop".to_string(),
                    "1".to_string(),
                    "-framerate".to_string(),
                    fps.to_string(),
                    "-t".to_string(),
                    format!("{duration:.3}"),
                    "-i".to_string(),
                    path.display().to_string(),
                ]);
                let frames = ((duration * fps as f64).round() as u64).max(1);
                let label = format!("img{input_count}");
                chains.push(format!(
                    "[{input_count}:v]{},{},setpts=PTS-STARTPTS+{start:.3}/TB[{label}]",
                    fit_filter(placement),
                    ken_burns_filter(motion, placement, frames, fps),
                ));
                current = push_overlay(&mut chains, &current, &label, segment, placement);
                input_count += 1;
            }
            SegmentContent::Video {
                path,
                placement,
                source_start_secs,
                ..
            } => {
                if duration <= 0.0 {
                    continue;
                }
                inputs.extend([
                    "-ss".to_string(),
                    format!("{source_start_secs:.3}"),
                    "-t".to_string(),
                    format!("{duration:.3}"),
                    "-i".to_string(),
                    path.display().to_string(),
                ]);
                let label = format!("vid{input_count}");
                chains.push(format!(
                    "[{input_count}:v]{},fps={fps},setpts=PTS-STARTPTS+{start:.3}/TB[{label}]",
                    fit_filter(placement),
                ));
                current = push_overlay(&mut chains, &current, &label, segment, placement);
                input_count += 1;
            }
            SegmentContent::Caption(cue) => captions.push((segment, cue)),
            SegmentContent::Narration { path } => {
                if audio_input.is_none() {
                    inputs.extend(["-i".to_string(), path.display().to_string()]);
                    audio_input = Some(input_count);
                    input_count += 1;
                }
            }
            SegmentContent::Fill { .. } => {}
        }
    }

    if !captions.is_empty() {
        let draws: Vec<String> = captions
            .iter()
            .flat_map(|(segment, cue)| drawtext_pair(segment, cue, settings))
            .collect();
        chains.push(format!("[{current}]{}[captioned]", draws.join(",")));
        current = "captioned".to_string();
    }
    chains.push(format!("[{current}]format=yuv420p[vout]"));

    let mut args = vec!["-hide_banner".to_string(), "-y".to_string()];
    args.extend(inputs);
    args.extend([
        "-filter_complex_script".to_string(),
        graph_path.display().to_string(),
        "-map".to_string(),
        "[vout]".to_string(),
    ]);
    match audio_input {
        Some(index) => args.extend(["-map".to_string(), format!("{index}:a")]),
        None => tracing::warn!("Timeline has no narration; rendering without audio"),
    }
    args.extend(codec_args(settings, audio_input.is_some()));
    args.extend([
        "-r".to_string(),
        fps.to_string(),
        "-t".to_string(),
        format!("{total:.3}"),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-nostats".to_string(),
        output.display().to_string(),
    ]);

    Ok(FfmpegPlan {
        args,
        filter_graph: chains.join(";\n"),
        input_count,
        total_frames: timeline.total_frames(),
        expected_duration_secs: total,
    })
}

/// Chain an overlay of `label` onto `current`; returns the new head label.
fn push_overlay(
    chains: &mut Vec<String>,
    current: &str,
    label: &str,
    segment: &Segment,
    placement: &Placement,
) -> String {
    let next = format!("{label}_on");
    chains.push(format!(
        "[{current}][{label}]overlay=x={}:y={}:eof_action=pass:enable='gte(t,{:.3})*lt(t,{:.3})'[{next}]",
        placement.band.x, placement.band.y, segment.start_secs, segment.end_secs,
    ));
    next
}

/// Scale a source so that it fills exactly its band rectangle.
fn fit_filter(placement: &Placement) -> String {
    let scaled = placement.scaled;
    let band = placement.band;
    let fit = match placement.crop {
        Some(crop) => format!(
            "scale={}:{},crop={}:{}:{}:{}",
            scaled.width, scaled.height, crop.width, crop.height, crop.x, crop.y
        ),
        None if placement.is_letterboxed() => format!(
            "scale={}:{},pad={}:{}:{}:{}:color=black",
            scaled.width,
            scaled.height,
            band.width,
            band.height,
            placement.offset_x,
            placement.offset_y
        ),
        None => format!("scale={}:{}", band.width, band.height),
    };
    format!("{fit},setsar=1")
}

/// `zoompan` moving from the motion's start zoom/focus to its end over `frames`.
fn ken_burns_filter(motion: &KenBurns, placement: &Placement, frames: u64, fps: u32) -> String {
    let dz = motion.zoom_to - motion.zoom_from;
    let dfx = motion.focus_to.0 - motion.focus_from.0;
    let dfy = motion.focus_to.1 - motion.focus_from.1;
    format!(
        "zoompan=z='{:.4}+{dz:.6}*on/{frames}':x='(iw-iw/zoom)*({:.4}+{dfx:.6}*on/{frames})':y='(ih-ih/zoom)*({:.4}+{dfy:.6}*on/{frames})':d=1:s={}x{}:fps={fps}",
        motion.zoom_from,
        motion.focus_from.0,
        motion.focus_from.1,
        placement.band.width,
        placement.band.height,
    )
}

/// Plain and highlighted draws of one caption word.
pub(crate) fn drawtext_pair(segment: &Segment, cue: &CaptionCue, settings: &RenderSettings) -> [String; 2] {
    let (start, end) = (segment.start_secs, segment.end_secs);
    let (hs, he) = (cue.highlight_start_secs, cue.highlight_end_secs);
    let plain = drawtext(
        cue,
        settings,
        &settings.font_color,
        &format!("gte(t,{start:.3})*lt(t,{end:.3})*not(gte(t,{hs:.3})*lt(t,{he:.3}))"),
    );
    let highlighted = drawtext(
        cue,
        settings,
        &settings.highlight_color,
        &format!("gte(t,{hs:.3})*lt(t,{he:.3})"),
    );
    [plain, highlighted]
}

fn drawtext(cue: &CaptionCue, settings: &RenderSettings, color: &str, enable: &str) -> String {
    let font = settings
        .font_file
        .as_ref()
        .map(|f| format!(":fontfile='{}'", escape_drawtext(&f.display().to_string())))
        .unwrap_or_default();
    format!(
        "drawtext=text='{}':expansion=none:x={}:y={}:fontsize={}:fontcolor={}:borderw={}:bordercolor={}{font}:enable='{enable}'",
        escape_drawtext(&cue.word),
        cue.x,
        cue.y,
        cue.font_size,
        ffmpeg_color(color),
        settings.stroke_width,
        ffmpeg_color(&settings.stroke_color),
    )
}

/// Escape a value for a quoted `drawtext` option inside a filter graph.
///
/// Apostrophes cannot appear inside a quoted graph value and become a
/// typographic apostrophe.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            '\'' => out.push('\u{2019}'),
            _ => out.push(c),
        }
    }
    out
}

/// `#RRGGBB` becomes `0xRRGGBB`; named colors pass through.
pub fn ffmpeg_color(color: &str) -> String {
    match color.strip_prefix('#') {
        Some(hex) if hex.chars().all(|c| c.is_ascii_hexdigit()) => format!("0x{hex}"),
        _ => color.to_string(),
    }
}

pub(crate) fn codec_args(settings: &RenderSettings, with_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-crf".to_string(),
        settings.crf.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ];
    if with_audio {
        args.extend([
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", settings.audio_bitrate_kbps.max(64)),
        ]);
    } else {
        args.push("-an".to_string());
    }
    args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    args
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(count)..].join("\n")
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_rendered = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered,
        total_frames,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortsmith_project_model::geometry::{Dimensions, Rect};
    use shortsmith_project_model::layout::{FitStrategy, VideoMode};
    use shortsmith_project_model::timeline::Layer;

    const IMAGE_BAND: Rect = Rect {
        x: 0,
        y: 144,
        width: 1080,
        height: 768,
    };
    const VIDEO_BAND: Rect = Rect {
        x: 0,
        y: 936,
        width: 1080,
        height: 840,
    };

    fn cover(band: Rect) -> Placement {
        Placement {
            strategy: FitStrategy::Cover,
            source: Dimensions::new(1920, 1080),
            band,
            scaled: Dimensions::new(1365, 768),
            crop: Some(Rect::new(142, 0, 1080, 768)),
            offset_x: 0,
            offset_y: 0,
        }
    }

    fn contain(band: Rect) -> Placement {
        Placement {
            strategy: FitStrategy::Contain,
            source: Dimensions::new(1920, 1080),
            band,
            scaled: Dimensions::new(1080, 608),
            crop: None,
            offset_x: 0,
            offset_y: 80,
        }
    }

    fn segment(layer: Layer, start: f64, end: f64, rect: Option<Rect>, content: SegmentContent) -> Segment {
        Segment {
            layer,
            start_secs: start,
            end_secs: end,
            rect,
            content,
        }
    }

    fn timeline(with_audio: bool) -> Timeline {
        let mut segments = vec![
            segment(
                Layer::Background,
                0.0,
                4.0,
                Some(Rect::full(Dimensions::VERTICAL_HD)),
                SegmentContent::Fill {
                    color: "black".to_string(),
                },
            ),
            segment(
                Layer::Image,
                0.0,
                2.0,
                Some(IMAGE_BAND),
                SegmentContent::Image {
                    path: PathBuf::from("/assets/factory.jpg"),
                    placement: cover(IMAGE_BAND),
                    motion: KenBurns {
                        zoom_from: 1.0,
                        zoom_to: 1.08,
                        focus_from: (0.5, 0.5),
                        focus_to: (0.5, 0.5),
                    },
                },
            ),
            segment(
                Layer::Image,
                2.0,
                4.0,
                Some(IMAGE_BAND),
                SegmentContent::Image {
                    path: PathBuf::from("/assets/belts.png"),
                    placement: cover(IMAGE_BAND),
                    motion: KenBurns::STILL,
                },
            ),
            segment(
                Layer::Video,
                0.0,
                4.0,
                Some(VIDEO_BAND),
                SegmentContent::Video {
                    path: PathBuf::from("/assets/gameplay.mp4"),
                    placement: contain(VIDEO_BAND),
                    source_start_secs: 10.0,
                    source_end_secs: 14.0,
                    loop_index: 0,
                },
            ),
            segment(
                Layer::Caption,
                0.0,
                1.0,
                Some(Rect::new(100, 1800, 400, 80)),
                SegmentContent::Caption(CaptionCue {
                    word: "Factory's".to_string(),
                    word_index: 0,
                    phrase_index: 0,
                    x: 100,
                    y: 1800,
                    font_size: 80,
                    highlight_start_secs: 0.0,
                    highlight_end_secs: 0.5,
                }),
            ),
        ];
        if with_audio {
            segments.push(segment(
                Layer::Audio,
                0.0,
                4.0,
                None,
                SegmentContent::Narration {
                    path: PathBuf::from("/work/voice.wav"),
                },
            ));
        }
        Timeline {
            canvas: Dimensions::VERTICAL_HD,
            fps: 30,
            mode: VideoMode::Standard,
            duration_secs: 4.0,
            segments,
        }
    }

    fn plan(timeline: &Timeline) -> FfmpegPlan {
        build_plan(
            timeline,
            &RenderSettings::default(),
            Path::new("/out/.game.partial.mp4"),
            Path::new("/out/.game.partial.filtergraph.txt"),
        )
        .unwrap()
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_plan_args_cover_inputs_maps_and_codec() {
        let plan = plan(&timeline(true));
        assert_eq!(plan.input_count, 4);
        assert_eq!(plan.args.iter().filter(|a| *a == "-i").count(), 4);
        assert!(has_pair(&plan.args, "-filter_complex_script", "/out/.game.partial.filtergraph.txt"));
        assert!(has_pair(&plan.args, "-map", "[vout]"));
        assert!(has_pair(&plan.args, "-map", "3:a"));
        assert!(has_pair(&plan.args, "-c:v", "libx264"));
        assert!(has_pair(&plan.args, "-crf", "23"));
        assert!(has_pair(&plan.args, "-b:a", "192k"));
        assert!(has_pair(&plan.args, "-progress", "pipe:1"));
        assert!(has_pair(&plan.args, "-ss", "10.000"));
        assert_eq!(plan.args.last().map(String::as_str), Some("/out/.game.partial.mp4"));
        assert_eq!(plan.total_frames, 120);
    }

    #[test]
    fn test_filter_graph_places_each_band() {
        let graph = plan(&timeline(true)).filter_graph;
        assert!(graph.starts_with("color=c=black:s=1080x1920:r=30:d=4.000[base]"));
        assert!(graph.contains("scale=1365:768,crop=1080:768:142:0,setsar=1"));
        assert!(graph.contains("scale=1080:608,pad=1080:840:0:80:color=black,setsar=1"));
        assert!(graph.contains("zoompan=z='1.0000+0.080000*on/60'"));
        assert!(graph.contains("s=1080x768:fps=30"));
        assert!(graph.contains("setpts=PTS-STARTPTS+2.000/TB"));
        assert!(graph.contains("overlay=x=0:y=144:eof_action=pass:enable='gte(t,2.000)*lt(t,4.000)'"));
        assert!(graph.contains("overlay=x=0:y=936"));
        assert!(graph.trim_end().ends_with("format=yuv420p[vout]"));
    }

    #[test]
    fn test_caption_is_drawn_plain_and_highlighted() {
        let graph = plan(&timeline(true)).filter_graph;
        assert_eq!(graph.matches("drawtext=").count(), 2);
        assert!(graph.contains("text='Factory\u{2019}s'"));
        assert!(graph.contains("fontcolor=0xFFFFFF"));
        assert!(graph.contains("fontcolor=0xFFD700"));
        assert!(graph.contains(
            "enable='gte(t,0.000)*lt(t,1.000)*not(gte(t,0.000)*lt(t,0.500))'"
        ));
        assert!(graph.contains("enable='gte(t,0.000)*lt(t,0.500)'"));
    }

    #[test]
    fn test_missing_narration_renders_silent() {
        let plan = plan(&timeline(false));
        assert!(plan.args.iter().any(|a| a == "-an"));
        assert!(!plan.args.iter().any(|a| a == "-c:a"));
        assert!(!plan.args.iter().any(|a| a.ends_with(":a")));
    }

    #[test]
    fn test_empty_timeline_is_rejected() {
        let mut empty = timeline(true);
        empty.duration_secs = 0.0;
        let err = build_plan(
            &empty,
            &RenderSettings::default(),
            Path::new("out.mp4"),
            Path::new("graph.txt"),
        )
        .unwrap_err();
        assert!(matches!(err, ShortsError::Render { .. }));
    }

    #[test]
    fn test_render_fails_fast_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("game.mp4");
        let mut backend = FfmpegBackend::new(RenderSettings::default());
        let err = backend.render(&timeline(true), &output, None).unwrap_err();
        assert!(matches!(err, ShortsError::FileNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("Ratio 3:1"), "Ratio 3\\:1");
        assert_eq!(escape_drawtext("back\\slash"), "back\\\\slash");
        assert_eq!(escape_drawtext("it's"), "it\u{2019}s");
        assert_eq!(escape_drawtext("100%, done"), "100%, done");
    }

    #[test]
    fn test_ffmpeg_color() {
        assert_eq!(ffmpeg_color("#FFD700"), "0xFFD700");
        assert_eq!(ffmpeg_color("black"), "black");
        assert_eq!(ffmpeg_color("#nothex"), "#nothex");
    }

    #[test]
    fn test_progress_state_and_report() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2000000");
        state.update("progress", "continue");
        let report = progress_report(&state, 120, 4.0, 1.0);
        assert!((report.progress - 0.5).abs() < 1e-9);
        assert_eq!(report.frames_rendered, 60);
        assert!((report.eta_secs - 1.0).abs() < 1e-9);
        assert_eq!(report.stage, RenderStage::Rendering);

        state.update("progress", "end");
        let done = progress_report(&state, 120, 4.0, 2.0);
        assert_eq!(done.progress, 1.0);
        assert_eq!(done.stage, RenderStage::Finalizing);
    }

    #[test]
    fn test_tail_lines_keeps_last_lines() {
        assert_eq!(tail_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail_lines("only", 5), "only");
    }
}
