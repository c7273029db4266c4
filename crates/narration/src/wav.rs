//! WAV measurement and generation.

use std::path::Path;

use shortsmith_common::error::{ShortsError, ShortsResult};

/// Sample rate used for generated tracks.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Decoded duration of a WAV file in seconds.
pub fn wav_duration_secs(path: &Path) -> ShortsResult<f64> {
    if !path.exists() {
        return Err(ShortsError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = hound::WavReader::open(path).map_err(|e| {
        ShortsError::synthesis(format!("Failed to read WAV {}: {e}", path.display()))
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ShortsError::synthesis(format!(
            "WAV {} reports a zero sample rate",
            path.display()
        )));
    }

    // `duration` counts samples per channel.
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Write `duration_secs` of 16-bit mono silence.
pub fn write_silence(path: &Path, duration_secs: f64, sample_rate: u32) -> ShortsResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (duration_secs.max(0.0) * sample_rate as f64).round() as u64;

    let to_error =
        |e: hound::Error| ShortsError::synthesis(format!("Failed to write {}: {e}", path.display()));
    let mut writer = hound::WavWriter::create(path, spec).map_err(to_error)?;
    for _ in 0..frames {
        writer.write_sample(0i16).map_err(to_error)?;
    }
    writer.finalize().map_err(to_error)?;

    tracing::debug!(path = %path.display(), duration_secs, "Wrote silent WAV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_round_trips_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silence(&path, 2.5, DEFAULT_SAMPLE_RATE).unwrap();
        let measured = wav_duration_secs(&path).unwrap();
        assert!((measured - 2.5).abs() < 1.0 / DEFAULT_SAMPLE_RATE as f64);
    }

    #[test]
    fn test_missing_wav_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = wav_duration_secs(&dir.path().join("nope.wav")).unwrap_err();
        assert!(matches!(err, ShortsError::FileNotFound { .. }));
    }

    #[test]
    fn test_garbage_file_is_synthesis_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-audio.wav");
        std::fs::write(&path, b"definitely not RIFF").unwrap();
        let err = wav_duration_secs(&path).unwrap_err();
        assert!(matches!(err, ShortsError::Synthesis { .. }));
    }
}
