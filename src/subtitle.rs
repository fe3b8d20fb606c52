use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{BoardsubError, Result};
use crate::transcribe::Transcription;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;
// Largest duration whose millisecond count still fits in a u64
const MAX_SECONDS: f64 = u64::MAX as f64 / 1000.0;

/// Controls how [`format_timestamp`] renders a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormat {
    /// Emit the `HH:` field even when the hour count is zero
    pub always_include_hours: bool,
    /// Separator between seconds and milliseconds
    pub decimal_marker: char,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            always_include_hours: false,
            decimal_marker: '.',
        }
    }
}

impl TimestampFormat {
    /// SRT flavour: `HH:MM:SS,mmm`
    pub const SRT: TimestampFormat = TimestampFormat {
        always_include_hours: true,
        decimal_marker: ',',
    };
}

/// Format a duration in seconds as `[HH:]MM:SS<marker>mmm`.
///
/// The duration is rounded to whole milliseconds before it is split, so a
/// value like `59.9995` carries into the minute field (`01:00.000`).
/// Rounding follows `f64::round`, i.e. halves round away from zero.
pub fn format_timestamp(seconds: f64, format: TimestampFormat) -> Result<String> {
    if !(seconds >= 0.0) || !seconds.is_finite() {
        return Err(BoardsubError::NegativeTimestamp(seconds));
    }
    if seconds >= MAX_SECONDS {
        return Err(BoardsubError::TimestampOutOfRange(seconds));
    }

    let mut milliseconds = (seconds * 1000.0).round() as u64;

    let hours = milliseconds / MS_PER_HOUR;
    milliseconds -= hours * MS_PER_HOUR;

    let minutes = milliseconds / MS_PER_MINUTE;
    milliseconds -= minutes * MS_PER_MINUTE;

    let secs = milliseconds / MS_PER_SECOND;
    milliseconds -= secs * MS_PER_SECOND;

    let hours_marker = if format.always_include_hours || hours > 0 {
        format!("{:02}:", hours)
    } else {
        String::new()
    };

    Ok(format!(
        "{}{:02}:{:02}{}{:03}",
        hours_marker, minutes, secs, format.decimal_marker, milliseconds
    ))
}

/// Render transcription segments as SRT text
pub fn render_srt(transcription: &Transcription) -> Result<String> {
    let mut srt_content = String::new();

    for (index, segment) in transcription.segments.iter().enumerate() {
        let start_time = format_timestamp(segment.start, TimestampFormat::SRT)?;
        let end_time = format_timestamp(segment.end, TimestampFormat::SRT)?;

        // "-->" inside caption text would be read as a timing line
        let text = segment.text.trim().replace("-->", "->");

        let _ = write!(
            srt_content,
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            start_time,
            end_time,
            text
        );
    }

    Ok(srt_content)
}

/// Generate SRT subtitle file from transcription
pub async fn generate_srt<P: AsRef<Path>>(
    transcription: &Transcription,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    let srt_content = render_srt(transcription)?;
    fs::write(output_path, srt_content).await?;

    info!("SRT file generated successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::TranscriptionSegment;
    use tokio_test::assert_err;

    fn fmt(seconds: f64) -> String {
        format_timestamp(seconds, TimestampFormat::default()).unwrap()
    }

    #[test]
    fn test_zero() {
        assert_eq!(fmt(0.0), "00:00.000");
        assert_eq!(format_timestamp(0.0, TimestampFormat::SRT).unwrap(), "00:00:00,000");
    }

    #[test]
    fn test_hours_with_srt_format() {
        assert_eq!(format_timestamp(3661.5, TimestampFormat::SRT).unwrap(), "01:01:01,500");
        assert_eq!(format_timestamp(65.123, TimestampFormat::SRT).unwrap(), "00:01:05,123");
    }

    #[test]
    fn test_hours_emitted_when_nonzero() {
        assert_eq!(fmt(3661.5), "01:01:01.500");
        assert_eq!(fmt(3599.0), "59:59.000");
    }

    #[test]
    fn test_rounding_carries_into_larger_units() {
        // 59.9995 * 1000 == 59999.5, rounds up to a full minute
        assert_eq!(fmt(59.9995), "01:00.000");
        assert_eq!(fmt(3599.9999), "01:00:00.000");
    }

    #[test]
    fn test_half_millisecond_rounds_away_from_zero() {
        // 0.0625 s is exactly 62.5 ms
        assert_eq!(fmt(0.0625), "00:00.063");
        assert_eq!(fmt(0.0004), "00:00.000");
    }

    #[test]
    fn test_custom_marker() {
        let format = TimestampFormat {
            always_include_hours: false,
            decimal_marker: ',',
        };
        assert_eq!(format_timestamp(12.345, format).unwrap(), "00:12,345");
    }

    #[test]
    fn test_negative_rejected_for_all_formats() {
        for always_include_hours in [false, true] {
            for decimal_marker in ['.', ','] {
                let format = TimestampFormat { always_include_hours, decimal_marker };
                assert_err!(format_timestamp(-0.001, format));
                assert_err!(format_timestamp(-3600.0, format));
            }
        }
        assert!(matches!(
            format_timestamp(-1.0, TimestampFormat::default()),
            Err(BoardsubError::NegativeTimestamp(_))
        ));
    }

    #[test]
    fn test_oversized_rejected() {
        assert!(matches!(
            format_timestamp(1e20, TimestampFormat::default()),
            Err(BoardsubError::TimestampOutOfRange(_))
        ));
        assert_err!(format_timestamp(f64::MAX, TimestampFormat::SRT));
        assert_eq!(
            format_timestamp(360_000.0, TimestampFormat::default()).unwrap(),
            "100:00:00.000"
        );
    }

    #[test]
    fn test_nan_rejected() {
        assert_err!(format_timestamp(f64::NAN, TimestampFormat::default()));
        assert_err!(format_timestamp(f64::INFINITY, TimestampFormat::SRT));
    }

    fn transcription(segments: &[(f64, f64, &str)]) -> Transcription {
        Transcription {
            text: String::new(),
            language: None,
            segments: segments
                .iter()
                .map(|(start, end, text)| TranscriptionSegment {
                    start: *start,
                    end: *end,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_srt() {
        let srt = render_srt(&transcription(&[
            (0.0, 2.5, " Hello there "),
            (2.5, 3661.5, "arrows --> here"),
        ]))
        .unwrap();

        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,500\nHello there\n\n\
             2\n00:00:02,500 --> 01:01:01,500\narrows -> here\n\n"
        );
    }

    #[test]
    fn test_render_srt_empty() {
        assert_eq!(render_srt(&transcription(&[])).unwrap(), "");
    }

    #[tokio::test]
    async fn test_generate_srt_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Subtitle.srt");
        generate_srt(&transcription(&[(1.0, 2.0, "hi")]), &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1\n00:00:01,000 --> 00:00:02,000\nhi\n\n");
    }
}
