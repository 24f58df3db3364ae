// Output filename derivation

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};

/// Container used when the input has no extension
const FALLBACK_EXTENSION: &str = "mp4";

#[derive(Debug, Clone, PartialEq)]
pub struct OutputNaming {
    pub prefix: String,
    pub suffix: String,
    /// Offset of the local service time zone; dates are stamped in it
    pub utc_offset: FixedOffset,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            prefix: "NHBC_Bal".to_string(),
            suffix: "Normalised_Audio".to_string(),
            // Australia/Brisbane, no daylight saving
            utc_offset: offset_from_hours(10),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Build a FixedOffset from whole hours; out-of-range values fall back to UTC
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(utc)
}

/// Derive `<dir>/<prefix>_<YYYY_MM_DD>_<suffix>.<ext>` next to the input
pub fn derive_output_path(input: &Path, naming: &OutputNaming, now: DateTime<Utc>) -> PathBuf {
    let date = now.with_timezone(&naming.utc_offset).format("%Y_%m_%d");

    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(FALLBACK_EXTENSION);

    let mut name = String::new();
    if !naming.prefix.is_empty() {
        name.push_str(&naming.prefix);
        name.push('_');
    }
    name.push_str(&date.to_string());
    if !naming.suffix.is_empty() {
        name.push('_');
        name.push_str(&naming.suffix);
    }
    name.push('.');
    name.push_str(ext);

    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(name)
}
