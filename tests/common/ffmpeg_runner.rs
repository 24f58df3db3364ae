#![allow(dead_code)]

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

fn tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if FFmpeg and FFprobe are both available
pub fn is_ffmpeg_available() -> bool {
    tool_available("ffmpeg") && tool_available("ffprobe")
}

fn run_generator(mut cmd: Command, what: &str) -> Result<()> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to generate {}", what))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Failed to generate {}: {}", what, stderr);
    }
    Ok(())
}

/// Small test recording: colour bars plus a steady 440 Hz tone
pub fn generate_test_recording(output_path: &Path, duration_secs: f32) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!("testsrc=duration={}:size=64x64:rate=10", duration_secs))
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!("sine=frequency=440:duration={}", duration_secs))
        .arg("-c:v")
        .arg("mpeg4")
        .arg("-c:a")
        .arg("aac")
        .arg("-shortest")
        .arg(output_path);

    run_generator(cmd, "test recording")
}

/// Recording with two audio tracks: a quiet mono tone first, then a loud stereo one.
/// ffmpeg's default stream selection would prefer the second.
pub fn generate_two_track_recording(output_path: &Path, duration_secs: f32) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!("testsrc=duration={}:size=64x64:rate=10", duration_secs))
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!("sine=frequency=440:duration={}", duration_secs))
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!(
            "aevalsrc=0.9*sin(2*PI*220*t)|0.9*sin(2*PI*220*t):d={}",
            duration_secs
        ))
        .args(["-map", "0:v", "-map", "1:a", "-map", "2:a"])
        .arg("-c:v")
        .arg("mpeg4")
        .arg("-c:a")
        .arg("aac")
        .arg("-shortest")
        .arg(output_path);

    run_generator(cmd, "two-track recording")
}

/// Video with no audio track at all
pub fn generate_silent_video(output_path: &Path, duration_secs: f32) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(format!("testsrc=duration={}:size=64x64:rate=10", duration_secs))
        .arg("-c:v")
        .arg("mpeg4")
        .arg("-an")
        .arg(output_path);

    run_generator(cmd, "video without audio")
}

/// Codec name of the first stream of the given type ("v" or "a")
pub fn probe_codec(path: &Path, stream: &str) -> Result<String> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-select_streams"])
        .arg(format!("{}:0", stream))
        .args(["-show_entries", "stream=codec_name", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe failed: {}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Channel count of every audio stream, in stream order
pub fn probe_audio_channels(path: &Path) -> Result<Vec<u32>> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "a"])
        .args(["-show_entries", "stream=channels", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe failed: {}", String::from_utf8_lossy(&output.stderr));
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().parse::<u32>().context("Bad channel count"))
        .collect()
}
