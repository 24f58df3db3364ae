// ffmpeg command construction for the two loudnorm passes

use super::loudnorm::{Measurement, analysis_filter, normalise_filter};
use super::params::NormaliserParams;
use std::path::Path;
use std::process::Command;

/// Audio stream measured in pass 1 and re-encoded in pass 2
pub const AUDIO_STREAM: &str = "0:a:0";

/// Pass 1: decode the first audio stream through loudnorm and discard the result.
/// The measurement JSON lands on stderr.
pub fn build_analysis_cmd(input: &Path, params: &NormaliserParams) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner").arg("-nostdin");
    cmd.arg("-i").arg(input);
    cmd.arg("-map").arg(AUDIO_STREAM);
    cmd.arg("-af").arg(analysis_filter(params));
    cmd.arg("-f").arg("null").arg("-");
    cmd
}

/// Pass 2: copy video untouched, re-encode audio through linear loudnorm
pub fn build_normalise_cmd(
    input: &Path,
    output: &Path,
    params: &NormaliserParams,
    measured: &Measurement,
    overwrite: bool,
    extra_args: &[String],
) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner").arg("-nostdin");

    // Never let ffmpeg prompt on stdin about an existing output
    cmd.arg(if overwrite { "-y" } else { "-n" });

    cmd.arg("-i").arg(input);

    // The measurement only holds for the stream pass 1 decoded; video is optional
    cmd.arg("-map").arg("0:v?");
    cmd.arg("-map").arg(AUDIO_STREAM);

    cmd.arg("-c:v").arg("copy");
    cmd.arg("-af").arg(normalise_filter(params, measured));
    cmd.arg("-c:a").arg(&params.audio_codec);
    cmd.arg("-b:a").arg(&params.audio_bitrate);
    if params.sample_rate > 0 {
        cmd.arg("-ar").arg(params.sample_rate.to_string());
    }

    cmd.args(extra_args);

    // Progress output on stdout
    cmd.arg("-progress").arg("-").arg("-nostats");

    cmd.arg(output);
    cmd
}

/// Split user supplied extra output arguments, shell-style
pub fn parse_extra_args(additional_args: &str) -> Vec<String> {
    if additional_args.trim().is_empty() {
        return Vec::new();
    }

    // Use shlex for shell-style parsing (respects quotes)
    if let Some(args) = shlex::split(additional_args) {
        args
    } else {
        // Unbalanced quotes: fall back to simple whitespace split
        additional_args
            .split_whitespace()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Render a command for display, quoting arguments that need it
pub fn format_cmd(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let s = arg.to_string_lossy();
            shlex::try_quote(&s)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| s.into_owned())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
