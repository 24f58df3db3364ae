use super::params::ValidationError;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Which of the two ffmpeg invocations a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Analysis,
    Normalise,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Analysis => write!(f, "pass 1 (analysis)"),
            Pass::Normalise => write!(f, "pass 2 (normalise)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NormaliseError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Output path is the same as the input: {}", .0.display())]
    OutputIsInput(PathBuf),

    #[error("Output file already exists: {} (use --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    #[error("Invalid normalisation settings: {}", join_errors(.0))]
    InvalidParams(Vec<ValidationError>),

    #[error("Failed to execute ffmpeg. Is ffmpeg installed and in PATH?")]
    Spawn(#[source] std::io::Error),

    #[error("Lost contact with ffmpeg during {pass}")]
    Io {
        pass: Pass,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg {pass} failed with {status}\n{stderr_tail}")]
    FfmpegFailed {
        pass: Pass,
        status: ExitStatus,
        stderr_tail: String,
    },

    #[error("No loudnorm JSON found in ffmpeg output (does the file have an audio track?)")]
    NoLoudnormJson,

    #[error("Could not read loudnorm statistics: {0}")]
    InvalidStats(String),

    #[error("Input audio is silent (measured loudness {0} LUFS), nothing to normalise")]
    SilentInput(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Last `max_lines` lines of ffmpeg's stderr, for error messages
pub fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    if lines.len() > max_lines {
        lines[lines.len() - max_lines..].join("\n")
    } else {
        lines.join("\n")
    }
}
