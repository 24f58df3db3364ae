// loudnorm filter strings and parsing of the pass 1 measurement

use super::error::NormaliseError;
use super::params::NormaliserParams;
use serde::{Deserialize, Serialize};

/// Measurement object printed by loudnorm with `print_format=json`.
/// ffmpeg prints every value as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoudnormStats {
    pub input_i: String,
    pub input_tp: String,
    pub input_lra: String,
    pub input_thresh: String,
    #[serde(default)]
    pub output_i: Option<String>,
    #[serde(default)]
    pub output_tp: Option<String>,
    #[serde(default)]
    pub output_lra: Option<String>,
    #[serde(default)]
    pub output_thresh: Option<String>,
    #[serde(default)]
    pub normalization_type: Option<String>,
    pub target_offset: String,
}

/// The five pass 1 values fed back into pass 2, parsed and checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub input_i: f64,
    pub input_tp: f64,
    pub input_lra: f64,
    pub input_thresh: f64,
    pub target_offset: f64,
}

impl LoudnormStats {
    pub fn measurement(&self) -> Result<Measurement, NormaliseError> {
        let input_i = parse_value("input_i", &self.input_i)?;
        if input_i.is_infinite() {
            return Err(NormaliseError::SilentInput(self.input_i.trim().to_string()));
        }

        let measurement = Measurement {
            input_i,
            input_tp: parse_value("input_tp", &self.input_tp)?,
            input_lra: parse_value("input_lra", &self.input_lra)?,
            input_thresh: parse_value("input_thresh", &self.input_thresh)?,
            target_offset: parse_value("target_offset", &self.target_offset)?,
        };

        for (name, value) in [
            ("input_tp", measurement.input_tp),
            ("input_lra", measurement.input_lra),
            ("input_thresh", measurement.input_thresh),
            ("target_offset", measurement.target_offset),
        ] {
            if !value.is_finite() {
                // thresh/tp go to -inf together with input_i on digital silence
                if value.is_infinite() && value < 0.0 {
                    return Err(NormaliseError::SilentInput(self.input_i.trim().to_string()));
                }
                return Err(NormaliseError::InvalidStats(format!(
                    "{} is not a finite number",
                    name
                )));
            }
        }

        Ok(measurement)
    }
}

fn parse_value(name: &str, raw: &str) -> Result<f64, NormaliseError> {
    raw.trim().parse::<f64>().map_err(|_| {
        NormaliseError::InvalidStats(format!("{} = {:?} is not a number", name, raw))
    })
}

/// Pull the loudnorm JSON object out of ffmpeg's mixed stderr.
///
/// loudnorm prints a flat object after a `[Parsed_loudnorm_N @ 0x...]` line at
/// the very end of the run, so the last `{ ... }` pair is the one we want.
pub fn extract_loudnorm_json(stderr: &str) -> Result<LoudnormStats, NormaliseError> {
    let close = stderr.rfind('}').ok_or(NormaliseError::NoLoudnormJson)?;
    let open = stderr[..close]
        .rfind('{')
        .ok_or(NormaliseError::NoLoudnormJson)?;

    let json = &stderr[open..=close];
    serde_json::from_str(json)
        .map_err(|e| NormaliseError::InvalidStats(format!("malformed loudnorm JSON: {}", e)))
}

/// Filter for the measuring pass
pub fn analysis_filter(params: &NormaliserParams) -> String {
    format!(
        "loudnorm=I={}:TP={}:LRA={}:print_format=json",
        params.target_lufs, params.true_peak, params.loudness_range
    )
}

/// Filter for the second pass, embedding the measured statistics
pub fn normalise_filter(params: &NormaliserParams, measured: &Measurement) -> String {
    format!(
        "loudnorm=I={}:TP={}:LRA={}:measured_I={}:measured_TP={}:measured_LRA={}:measured_thresh={}:offset={}:linear=true:print_format=summary",
        params.target_lufs,
        params.true_peak,
        params.loudness_range,
        measured.input_i,
        measured.input_tp,
        measured.input_lra,
        measured.input_thresh,
        measured.target_offset
    )
}
