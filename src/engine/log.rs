use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SESSION_LOG_NAME: &str = "sermon-norm.log";

/// Path of the session log kept next to the normalised output
pub fn session_log_path(output: &Path) -> PathBuf {
    output
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(SESSION_LOG_NAME)
}

/// Append a timestamped entry to the session log, creating it if needed
pub fn write_session_log(log_path: &Path, message: &str) -> Result<()> {
    use std::fs::OpenOptions;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{}] {}", timestamp, message)?;
    Ok(())
}

/// Best-effort `write_session_log`: a failed write never stops a run
pub fn log_session(log_path: &Path, message: &str) {
    if let Err(e) = write_session_log(log_path, message) {
        tracing::debug!(path = %log_path.display(), "session log not written: {:#}", e);
    }
}
