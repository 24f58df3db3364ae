use chrono::{TimeZone, Utc};
use sermon_norm::config::Config;
use sermon_norm::engine::derive_output_path;
use std::path::{Path, PathBuf};

#[test]
fn configured_naming_flows_into_output_path() {
    let config = Config::from_toml(
        r#"
        [output]
        prefix = "Church"
        suffix = "Loud"
        utc_offset_hours = 0
        "#,
    )
    .unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
    let out = derive_output_path(Path::new("/rec/take1.mkv"), &config.output.naming(), now);
    assert_eq!(out, PathBuf::from("/rec/Church_2025_06_01_Loud.mkv"));
}

#[test]
fn default_naming_stamps_brisbane_date() {
    let config = Config::default();
    // 23:00 UTC on the 1st is 09:00 on the 2nd in Brisbane
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
    let out = derive_output_path(Path::new("/rec/take1.mp4"), &config.output.naming(), now);
    assert_eq!(
        out,
        PathBuf::from("/rec/NHBC_Bal_2025_06_02_Normalised_Audio.mp4")
    );
}
