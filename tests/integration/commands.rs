// Snapshots of the generated ffmpeg command lines

use insta::assert_snapshot;
use sermon_norm::engine::{
    NormaliserParams, build_analysis_cmd, build_normalise_cmd, parse_extra_args,
};
use std::path::PathBuf;

use crate::common::helpers::*;

#[test]
fn snapshot_analysis_default_targets() {
    let cmd = build_analysis_cmd(
        &PathBuf::from("/tmp/input.mp4"),
        &NormaliserParams::default(),
    );
    assert_snapshot!(
        cmd_to_string(&cmd),
        @"ffmpeg -hide_banner -nostdin -i /tmp/input.mp4 -map 0:a:0 -af loudnorm=I=-27:TP=-2:LRA=7:print_format=json -f null -"
    );
}

#[test]
fn snapshot_analysis_broadcast_targets() {
    let params = NormaliserParams {
        target_lufs: -23.0,
        true_peak: -1.0,
        loudness_range: 11.5,
        ..NormaliserParams::default()
    };
    let cmd = build_analysis_cmd(&PathBuf::from("/tmp/input.mp4"), &params);
    assert_snapshot!(
        cmd_to_string(&cmd),
        @"ffmpeg -hide_banner -nostdin -i /tmp/input.mp4 -map 0:a:0 -af loudnorm=I=-23:TP=-1:LRA=11.5:print_format=json -f null -"
    );
}

#[test]
fn snapshot_normalise_default() {
    let cmd = build_normalise_cmd(
        &PathBuf::from("/tmp/input.mp4"),
        &PathBuf::from("/tmp/output.mp4"),
        &NormaliserParams::default(),
        &sample_measurement(),
        true,
        &[],
    );
    assert_snapshot!(
        cmd_to_string(&cmd),
        @"ffmpeg -hide_banner -nostdin -y -i /tmp/input.mp4 -map 0:v? -map 0:a:0 -c:v copy -af loudnorm=I=-27:TP=-2:LRA=7:measured_I=-31.48:measured_TP=-9.12:measured_LRA=11.3:measured_thresh=-42.07:offset=-0.58:linear=true:print_format=summary -c:a aac -b:a 192k -ar 48000 -progress - -nostats /tmp/output.mp4"
    );
}

#[test]
fn snapshot_normalise_opus_with_extra_args() {
    let params = NormaliserParams {
        audio_codec: "libopus".to_string(),
        audio_bitrate: "96k".to_string(),
        sample_rate: 0,
        ..NormaliserParams::default()
    };
    let extra = parse_extra_args("-movflags +faststart");
    let cmd = build_normalise_cmd(
        &PathBuf::from("/tmp/input.mkv"),
        &PathBuf::from("/tmp/output.mkv"),
        &params,
        &sample_measurement(),
        false,
        &extra,
    );
    assert_snapshot!(
        cmd_to_string(&cmd),
        @"ffmpeg -hide_banner -nostdin -n -i /tmp/input.mkv -map 0:v? -map 0:a:0 -c:v copy -af loudnorm=I=-27:TP=-2:LRA=7:measured_I=-31.48:measured_TP=-9.12:measured_LRA=11.3:measured_thresh=-42.07:offset=-0.58:linear=true:print_format=summary -c:a libopus -b:a 96k -movflags +faststart -progress - -nostats /tmp/output.mkv"
    );
}

#[test]
fn normalise_filter_carries_all_measurements() {
    let cmd = build_normalise_cmd(
        &PathBuf::from("in.mp4"),
        &PathBuf::from("out.mp4"),
        &NormaliserParams::default(),
        &sample_measurement(),
        false,
        &[],
    );
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    let af = args
        .iter()
        .position(|a| a == "-af")
        .map(|i| args[i + 1].clone())
        .expect("-af present");

    for part in [
        "measured_I=-31.48",
        "measured_TP=-9.12",
        "measured_LRA=11.3",
        "measured_thresh=-42.07",
        "offset=-0.58",
        "linear=true",
    ] {
        assert!(af.contains(part), "{} missing from {}", part, af);
    }
}
