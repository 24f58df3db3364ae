#![allow(dead_code)]

use sermon_norm::engine::{LoudnormStats, Measurement};
use std::process::Command;

/// Convert a Command to a string for testing/assertions
pub fn cmd_to_string(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();

    format!("{} {}", program, args.join(" "))
}

/// Measurement as ffmpeg reports it for a typical quiet sermon recording
pub fn sample_stats() -> LoudnormStats {
    LoudnormStats {
        input_i: "-31.48".to_string(),
        input_tp: "-9.12".to_string(),
        input_lra: "11.30".to_string(),
        input_thresh: "-42.07".to_string(),
        output_i: Some("-27.42".to_string()),
        output_tp: Some("-4.95".to_string()),
        output_lra: Some("7.10".to_string()),
        output_thresh: Some("-38.01".to_string()),
        normalization_type: Some("dynamic".to_string()),
        target_offset: "-0.58".to_string(),
    }
}

pub fn sample_measurement() -> Measurement {
    sample_stats()
        .measurement()
        .expect("sample stats are well-formed")
}
