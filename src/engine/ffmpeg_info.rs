use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

/// First line of `<tool> -version`, e.g. "ffmpeg version 6.1.1 ..."
fn tool_version(tool: &str) -> Result<String> {
    let output = Command::new(tool)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {tool}. Is {tool} installed and in PATH?"))?;

    if !output.status.success() {
        anyhow::bail!("{tool} -version exited with {}", output.status);
    }

    Ok(first_line(&String::from_utf8_lossy(&output.stdout)))
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown version")
        .to_string()
}

pub fn ffmpeg_version() -> Result<String> {
    tool_version("ffmpeg")
}

/// Only needed for the progress percentage
pub fn ffprobe_version() -> Result<String> {
    tool_version("ffprobe")
}

/// Check if ffmpeg was built with the loudnorm filter
pub fn loudnorm_filter_available() -> bool {
    let output = Command::new("ffmpeg")
        .arg("-hide_banner")
        .arg("-filters")
        .output();

    match output {
        Ok(out) if out.status.success() => {
            filters_list_has_loudnorm(&String::from_utf8_lossy(&out.stdout))
        }
        _ => false,
    }
}

fn filters_list_has_loudnorm(listing: &str) -> bool {
    // Lines look like " ... loudnorm          A->A       EBU R128 loudness normalization"
    listing
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some("loudnorm"))
}

/// Recording length in seconds, used to turn ffmpeg's position into a percentage
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe could not read {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_ffprobe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Duration in seconds from `ffprobe -show_format` JSON. Streams without a
/// container duration (raw audio piped in, still images) are an error.
pub fn parse_ffprobe_duration(json: &str) -> Result<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("Unreadable ffprobe output")?;

    let seconds = probe
        .format
        .duration
        .context("ffprobe reported no duration")?
        .parse::<f64>()
        .context("ffprobe duration is not a number")?;

    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        anyhow::bail!("ffprobe reported a duration of {seconds}")
    }
}
