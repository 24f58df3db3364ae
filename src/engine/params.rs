//! Loudness targets and output audio settings for a normalisation run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Integrated loudness range accepted by loudnorm's `I` option
pub const TARGET_LUFS_RANGE: RangeInclusive<f64> = -70.0..=-5.0;
/// True peak range accepted by loudnorm's `TP` option
pub const TRUE_PEAK_RANGE: RangeInclusive<f64> = -9.0..=0.0;
/// Loudness range accepted by loudnorm's `LRA` option
pub const LOUDNESS_RANGE_RANGE: RangeInclusive<f64> = 1.0..=50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormaliserParams {
    /// Target integrated loudness in LUFS
    pub target_lufs: f64,

    /// Maximum true peak in dBTP
    pub true_peak: f64,

    /// Target loudness range in LU
    pub loudness_range: f64,

    /// ffmpeg audio encoder name (e.g. "aac", "libopus")
    pub audio_codec: String,

    /// ffmpeg bitrate string (e.g. "192k")
    pub audio_bitrate: String,

    /// Output sample rate in Hz, 0 keeps ffmpeg's choice.
    /// loudnorm upsamples to 192 kHz internally, so leaving this at 0 usually
    /// produces a 192 kHz file.
    pub sample_rate: u32,
}

impl Default for NormaliserParams {
    // Netflix-style speech targets used at NHBC Balmoral
    fn default() -> Self {
        Self {
            target_lufs: -27.0,
            true_peak: -2.0,
            loudness_range: 7.0,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            sample_rate: 48_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: f64,
    range: &RangeInclusive<f64>,
    unit: &str,
) {
    if !value.is_finite() || !range.contains(&value) {
        errors.push(err(
            field,
            format!(
                "{} {} is outside {} ..= {} {}",
                value,
                unit,
                range.start(),
                range.end(),
                unit
            ),
        ));
    }
}

/// Accepts ffmpeg bitrate shorthand: digits with an optional k/K/M suffix
fn is_valid_bitrate(s: &str) -> bool {
    let digits = s.trim_end_matches(['k', 'K', 'M']);
    let suffix_len = s.len() - digits.len();
    !digits.is_empty()
        && suffix_len <= 1
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.parse::<u64>().map(|n| n > 0).unwrap_or(false)
}

impl NormaliserParams {
    /// Validate against the ranges loudnorm accepts. Reports every bad field.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        check_range(
            &mut errors,
            "target_lufs",
            self.target_lufs,
            &TARGET_LUFS_RANGE,
            "LUFS",
        );
        check_range(
            &mut errors,
            "true_peak",
            self.true_peak,
            &TRUE_PEAK_RANGE,
            "dBTP",
        );
        check_range(
            &mut errors,
            "loudness_range",
            self.loudness_range,
            &LOUDNESS_RANGE_RANGE,
            "LU",
        );

        if self.audio_codec.trim().is_empty() {
            errors.push(err("audio_codec", "codec name is empty"));
        } else if self.audio_codec.chars().any(char::is_whitespace) {
            errors.push(err(
                "audio_codec",
                format!("'{}' contains whitespace", self.audio_codec),
            ));
        }

        if !is_valid_bitrate(&self.audio_bitrate) {
            errors.push(err(
                "audio_bitrate",
                format!(
                    "'{}' is not a bitrate (expected e.g. 192k or 128000)",
                    self.audio_bitrate
                ),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Human-readable settings block printed before the operator confirms
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Target LUFS: {:.1}", self.target_lufs),
            format!("True Peak: {:.1} dBTP", self.true_peak),
            format!("Loudness Range: {:.1} LU", self.loudness_range),
            format!("Audio Codec: {}", self.audio_codec.to_uppercase()),
            format!("Audio Bitrate: {}", self.audio_bitrate),
        ];
        if self.sample_rate > 0 {
            lines.push(format!("Sample Rate: {} Hz", self.sample_rate));
        }
        lines
    }
}
