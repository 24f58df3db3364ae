// End-to-end tests that actually run ffmpeg
//
// These generate a short recording with lavfi and push it through both passes

use sermon_norm::engine::{NormaliseError, Normaliser, NormaliserParams, Pass};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::ffmpeg_runner::*;

// Helper to check if FFmpeg is available, skip test if not
macro_rules! require_ffmpeg {
    () => {
        if !is_ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }
    };
}

fn create_test_recording(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("sermon.mp4");
    // loudnorm needs a few seconds for a stable integrated measurement
    generate_test_recording(&path, 5.0).expect("Failed to generate test recording");
    path
}

#[test]
fn e2e_two_pass_hits_target() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_recording(&temp_dir);
    let output = temp_dir.path().join("normalised.mp4");

    let normaliser = Normaliser::new(NormaliserParams::default()).unwrap();

    let mut last_pct = 0.0;
    let stats = normaliser
        .run(&input, &output, |_, pct| last_pct = pct)
        .expect("normalisation failed");

    assert!(stats.measurement().is_ok());
    assert!(output.exists(), "output was not written");
    assert_eq!(last_pct, 100.0);

    // Video is copied, audio re-encoded with the configured codec
    assert_eq!(probe_codec(&output, "v").unwrap(), "mpeg4");
    assert_eq!(probe_codec(&output, "a").unwrap(), "aac");

    let remeasured = normaliser
        .analyse(&output)
        .unwrap()
        .measurement()
        .unwrap();
    assert!(
        (remeasured.input_i - (-27.0)).abs() < 2.0,
        "expected about -27 LUFS, got {}",
        remeasured.input_i
    );
}

#[test]
fn e2e_normalises_the_measured_track() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("two_tracks.mp4");
    generate_two_track_recording(&input, 5.0).unwrap();
    assert_eq!(probe_audio_channels(&input).unwrap(), vec![1, 2]);

    let output = temp_dir.path().join("normalised.mp4");
    let normaliser = Normaliser::new(NormaliserParams::default()).unwrap();
    normaliser
        .run(&input, &output, |_, _| {})
        .expect("normalisation failed");

    // Only the first (mono) track is kept, the one pass 1 measured
    assert_eq!(probe_audio_channels(&output).unwrap(), vec![1]);
    assert_eq!(probe_codec(&output, "v").unwrap(), "mpeg4");
}

#[test]
fn e2e_analyse_reports_json_fields() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_recording(&temp_dir);

    let normaliser = Normaliser::new(NormaliserParams::default()).unwrap();
    let stats = normaliser.analyse(&input).expect("analysis failed");

    let m = stats.measurement().unwrap();
    assert!(m.input_i < 0.0);
    assert!(m.input_tp <= 0.0);
    assert!(stats.output_i.is_some());
}

#[test]
fn e2e_missing_audio_fails_in_analysis() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("no_audio.mp4");
    generate_silent_video(&input, 1.0).unwrap();

    let normaliser = Normaliser::new(NormaliserParams::default()).unwrap();
    match normaliser.analyse(&input) {
        Err(NormaliseError::FfmpegFailed { pass, .. }) => assert_eq!(pass, Pass::Analysis),
        other => panic!("expected analysis failure, got {:?}", other),
    }
}

#[test]
fn e2e_unknown_codec_fails_in_normalise() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_recording(&temp_dir);
    let output = temp_dir.path().join("normalised.mp4");

    let params = NormaliserParams {
        audio_codec: "no_such_encoder".to_string(),
        ..NormaliserParams::default()
    };
    let normaliser = Normaliser::new(params).unwrap();
    match normaliser.run(&input, &output, |_, _| {}) {
        Err(NormaliseError::FfmpegFailed {
            pass, stderr_tail, ..
        }) => {
            assert_eq!(pass, Pass::Normalise);
            assert!(stderr_tail.contains("no_such_encoder"));
        }
        other => panic!("expected normalise failure, got {:?}", other),
    }
}

#[test]
fn missing_input_fails_before_ffmpeg_runs() {
    let normaliser = Normaliser::new(NormaliserParams::default()).unwrap();
    let input = PathBuf::from("/nonexistent/sermon.mp4");
    let output = std::env::temp_dir().join("never_written.mp4");

    let err = normaliser.run(&input, &output, |_, _| {}).unwrap_err();
    assert!(matches!(err, NormaliseError::InputNotFound(_)));
    assert_eq!(
        err.to_string(),
        "Input file not found: /nonexistent/sermon.mp4"
    );
}
