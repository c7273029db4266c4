//! Subtitle generation in SRT and VTT formats.

use std::path::Path;

use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::narration::{CaptionPhrase, WordTiming};

/// One subtitle entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// One cue per word.
pub fn cues_from_words(timings: &[WordTiming]) -> Vec<SubtitleCue> {
    timings
        .iter()
        .map(|t| SubtitleCue {
            start_secs: t.start_secs,
            end_secs: t.end_secs,
            text: t.word.clone(),
        })
        .collect()
}

/// One cue per caption phrase.
pub fn cues_from_phrases(phrases: &[CaptionPhrase]) -> Vec<SubtitleCue> {
    phrases
        .iter()
        .map(|p| SubtitleCue {
            start_secs: p.start_secs(),
            end_secs: p.end_secs(),
            text: p.text(),
        })
        .collect()
}

/// Generate SRT subtitle content.
pub fn generate_srt(cues: &[SubtitleCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT subtitle content.
pub fn generate_vtt(cues: &[SubtitleCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for cue in cues {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format seconds as SRT timestamp: HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Save subtitles to a file; `.vtt` selects WebVTT, `.srt` or no extension
/// SRT.
pub fn save_subtitles(cues: &[SubtitleCue], path: &Path) -> ShortsResult<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("vtt") => generate_vtt(cues),
        Some(ext) if ext.eq_ignore_ascii_case("srt") => generate_srt(cues),
        None => generate_srt(cues),
        Some(ext) => {
            return Err(ShortsError::unsupported(format!(
                "Subtitle format .{ext} (use .srt or .vtt)"
            )))
        }
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), cues = cues.len(), "Wrote subtitles");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(index: usize, word: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            index,
            word: word.to_string(),
            start_secs: start,
            end_secs: end,
        }
    }

    #[test]
    fn test_srt_generation() {
        let cues = cues_from_words(&[
            timing(0, "Satisfactory", 0.0, 2.5),
            timing(1, "drops", 3.0, 5.0),
        ]);

        let srt = generate_srt(&cues);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nSatisfactory"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\ndrops"));
    }

    #[test]
    fn test_vtt_generation_from_phrases() {
        let phrase = CaptionPhrase {
            words: vec![
                timing(0, "One", 61.5, 62.0),
                timing(1, "minute", 62.0, 62.6),
                timing(2, "in", 62.6, 63.0),
            ],
        };

        let vtt = generate_vtt(&cues_from_phrases(&[phrase]));
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000\nOne minute in"));
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3661.5), "01:01:01,500");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        // 0.3 s must not truncate to 299 ms.
        assert_eq!(format_srt_time(0.1 + 0.2), "00:00:00,300");
    }

    #[test]
    fn test_save_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cues = cues_from_words(&[timing(0, "alien", 0.0, 1.0)]);

        let vtt_path = dir.path().join("captions.VTT");
        save_subtitles(&cues, &vtt_path).unwrap();
        assert!(std::fs::read_to_string(&vtt_path)
            .unwrap()
            .starts_with("WEBVTT"));

        let srt_path = dir.path().join("out").join("captions.srt");
        save_subtitles(&cues, &srt_path).unwrap();
        assert!(std::fs::read_to_string(&srt_path)
            .unwrap()
            .starts_with("1\n00:00:00,000"));
    }

    #[test]
    fn test_save_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captions.ass");
        let err = save_subtitles(&[], &path).unwrap_err();
        assert!(matches!(err, ShortsError::Unsupported { .. }));
        assert!(!path.exists());
    }
}
