//! Narration synthesizers.
//!
//! A synthesizer turns script text into a WAV file and reports the measured
//! duration. The pipeline only sees the [`NarrationSynthesizer`] trait, so
//! tests can substitute a fake.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use shortsmith_common::config::TtsConfig;
use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_common::process::command_exists;
use shortsmith_project_model::narration::NarrationTrack;

use crate::wav::{wav_duration_secs, write_silence, DEFAULT_SAMPLE_RATE};

/// Voice settings passed through to the TTS engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceParams {
    pub exaggeration: f64,
    pub cfg_weight: f64,
    pub temperature: f64,
    /// Speaking rate used when the duration has to be estimated.
    pub words_per_minute: u32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            exaggeration: 0.3,
            cfg_weight: 0.5,
            temperature: 0.85,
            words_per_minute: 180,
        }
    }
}

impl From<&TtsConfig> for VoiceParams {
    fn from(config: &TtsConfig) -> Self {
        Self {
            exaggeration: config.exaggeration,
            cfg_weight: config.cfg_weight,
            temperature: config.temperature,
            words_per_minute: config.words_per_minute,
        }
    }
}

/// Trait for narration backends (external TTS, silence, test fakes).
pub trait NarrationSynthesizer: Send {
    /// Synthesize `text` into a WAV at `output` and measure it.
    ///
    /// Fails with `SynthesisError` on empty text or when no usable audio is
    /// produced.
    fn synthesize(
        &mut self,
        text: &str,
        voice: &VoiceParams,
        output: &Path,
    ) -> ShortsResult<NarrationTrack>;

    /// Check if this backend can run on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

fn ensure_text(text: &str) -> ShortsResult<()> {
    if text.trim().is_empty() {
        return Err(ShortsError::synthesis("Cannot synthesize an empty script"));
    }
    Ok(())
}

fn ensure_parent(output: &Path) -> ShortsResult<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Measure a finished WAV and wrap it as a track.
fn measure(output: &Path) -> ShortsResult<NarrationTrack> {
    let duration = wav_duration_secs(output)?;
    NarrationTrack::new(output, duration)
}

/// Runs an external TTS program.
///
/// The script is written to the program's stdin. Placeholders in the argument
/// list are substituted: `{output}`, `{exaggeration}`, `{cfg_weight}`,
/// `{temperature}`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &TtsConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with placeholders filled in.
    pub fn resolved_args(&self, voice: &VoiceParams, output: &Path) -> Vec<String> {
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{exaggeration}", &voice.exaggeration.to_string())
                    .replace("{cfg_weight}", &voice.cfg_weight.to_string())
                    .replace("{temperature}", &voice.temperature.to_string())
            })
            .collect()
    }
}

impl NarrationSynthesizer for CommandSynthesizer {
    fn synthesize(
        &mut self,
        text: &str,
        voice: &VoiceParams,
        output: &Path,
    ) -> ShortsResult<NarrationTrack> {
        ensure_text(text)?;
        ensure_parent(output)?;

        let args = self.resolved_args(voice, output);
        tracing::info!(
            program = %self.program,
            output = %output.display(),
            chars = text.len(),
            "Synthesizing narration"
        );
        tracing::debug!(?args, "TTS arguments");

        let started = std::time::Instant::now();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ShortsError::synthesis(format!("Failed to start {}: {e}", self.program))
            })?;

        if let Some(stdin) = child.stdin.take() {
            if let Err(e) = send_script(stdin, text) {
                reap(&mut child);
                return Err(ShortsError::synthesis(format!(
                    "Failed to send script to {}: {e}",
                    self.program
                )));
            }
        }

        let result = child.wait_with_output().map_err(|e| {
            ShortsError::synthesis(format!("Failed to wait on {}: {e}", self.program))
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ShortsError::synthesis(format!(
                "{} failed (status {}): {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }
        if !output.exists() {
            return Err(ShortsError::synthesis(format!(
                "{} finished but wrote no audio to {}",
                self.program,
                output.display()
            )));
        }

        let track = measure(output)?;
        tracing::info!(
            duration_secs = track.duration_secs(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Narration synthesized"
        );
        Ok(track)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.program)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Write the script and close the pipe. Programs that take the text some
/// other way may exit without reading stdin, so a broken pipe is not an error.
fn send_script<W: Write>(mut stdin: W, text: &str) -> std::io::Result<()> {
    match stdin.write_all(text.as_bytes()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("TTS program closed stdin early");
            Ok(())
        }
        other => other,
    }
}

/// Kill an abandoned child and collect its exit status.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "TTS program already exited");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "Failed to wait on TTS program");
    }
}

/// Writes a silent track as long as the script would take to read aloud.
///
/// Useful for previews and for machines without a TTS engine.
#[derive(Debug, Clone)]
pub struct SilentSynthesizer {
    sample_rate: u32,
    min_duration_secs: f64,
}

impl Default for SilentSynthesizer {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            min_duration_secs: 1.0,
        }
    }
}

impl SilentSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimated speaking time for `text`.
    pub fn estimate_secs(&self, text: &str, voice: &VoiceParams) -> f64 {
        let words = text.split_whitespace().count() as f64;
        (words / voice.words_per_minute.max(1) as f64 * 60.0).max(self.min_duration_secs)
    }
}

impl NarrationSynthesizer for SilentSynthesizer {
    fn synthesize(
        &mut self,
        text: &str,
        voice: &VoiceParams,
        output: &Path,
    ) -> ShortsResult<NarrationTrack> {
        ensure_text(text)?;
        ensure_parent(output)?;
        let duration = self.estimate_secs(text, voice);
        write_silence(output, duration, self.sample_rate)?;
        tracing::info!(
            output = %output.display(),
            duration_secs = duration,
            "Wrote silent narration"
        );
        measure(output)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Default narration path inside a working directory.
pub fn narration_path(work_dir: &Path, safe_name: &str) -> PathBuf {
    work_dir.join(format!("{safe_name}_narration.wav"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_args_substitute_placeholders() {
        let synth = CommandSynthesizer::new(
            "piper",
            vec![
                "--output_file".to_string(),
                "{output}".to_string(),
                "--temperature={temperature}".to_string(),
            ],
        );
        let args = synth.resolved_args(&VoiceParams::default(), Path::new("/tmp/n.wav"));
        assert_eq!(args, vec!["--output_file", "/tmp/n.wav", "--temperature=0.85"]);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("n.wav");
        let err = SilentSynthesizer::new()
            .synthesize("   \n", &VoiceParams::default(), &out)
            .unwrap_err();
        assert!(matches!(err, ShortsError::Synthesis { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_silent_synthesizer_matches_estimate() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("n.wav");
        let text = vec!["word"; 90].join(" ");
        let track = SilentSynthesizer::new()
            .synthesize(&text, &VoiceParams::default(), &out)
            .unwrap();
        assert!((track.duration_secs() - 30.0).abs() < 1e-3);
        assert_eq!(track.audio_path(), out.as_path());
    }

    #[test]
    fn test_silent_synthesizer_has_minimum_length() {
        let estimate = SilentSynthesizer::new().estimate_secs("Hi", &VoiceParams::default());
        assert_eq!(estimate, 1.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_synthesizer_measures_program_output() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        write_silence(&fixture, 1.5, DEFAULT_SAMPLE_RATE).unwrap();

        let mut synth = CommandSynthesizer::new(
            "cp",
            vec![fixture.display().to_string(), "{output}".to_string()],
        );
        let out = dir.path().join("narration.wav");
        let track = synth
            .synthesize("Satisfactory drops you on a massive alien world", &VoiceParams::default(), &out)
            .unwrap();
        assert!((track.duration_secs() - 1.5).abs() < 1e-3);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_synthesizer_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = CommandSynthesizer::new("false", Vec::new());
        let err = synth
            .synthesize("hello", &VoiceParams::default(), &dir.path().join("n.wav"))
            .unwrap_err();
        assert!(matches!(err, ShortsError::Synthesis { .. }));
    }

    struct FailingPipe(std::io::ErrorKind);

    impl Write for FailingPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(self.0))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_script_tolerates_only_broken_pipe() {
        assert!(send_script(FailingPipe(std::io::ErrorKind::BrokenPipe), "hello").is_ok());
        let err = send_script(FailingPipe(std::io::ErrorKind::PermissionDenied), "hello").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);

        let mut sink = Vec::new();
        send_script(&mut sink, "hello").unwrap();
        assert_eq!(sink, b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_reap_leaves_no_running_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_missing_program_is_synthesis_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = CommandSynthesizer::new("shortsmith-no-such-tts-binary", Vec::new());
        assert!(!synth.is_available());
        let err = synth
            .synthesize("hello", &VoiceParams::default(), &dir.path().join("n.wav"))
            .unwrap_err();
        assert!(matches!(err, ShortsError::Synthesis { .. }));
    }
}
