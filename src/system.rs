// Scheduling and cancelling an OS shutdown after a run

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Command that powers the machine off after `delay_seconds`
    pub fn shutdown_command(self, delay_seconds: u64) -> Command {
        let mut cmd = Command::new("shutdown");
        match self {
            Platform::Windows => {
                cmd.args(["/s", "/t"]).arg(delay_seconds.to_string());
            }
            Platform::Unix => {
                // shutdown(8) only takes whole minutes
                let minutes = delay_seconds.div_ceil(60);
                let when = if minutes == 0 {
                    "now".to_string()
                } else {
                    format!("+{}", minutes)
                };
                cmd.arg("-h").arg(when);
            }
        }
        cmd
    }

    /// Command that aborts a pending shutdown
    pub fn cancel_command(self) -> Command {
        let mut cmd = Command::new("shutdown");
        match self {
            Platform::Windows => cmd.arg("/a"),
            Platform::Unix => cmd.arg("-c"),
        };
        cmd
    }
}

fn run(mut cmd: Command, what: &str) -> Result<()> {
    debug!(program = ?cmd.get_program(), args = ?cmd.get_args().collect::<Vec<_>>(), "{}", what);
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute shutdown command to {}", what))?;

    if !output.status.success() {
        anyhow::bail!(
            "shutdown command to {} failed with {}: {}",
            what,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Schedule a shutdown of this machine after `delay_seconds`
pub fn schedule_shutdown(delay_seconds: u64) -> Result<()> {
    run(
        Platform::current().shutdown_command(delay_seconds),
        "schedule shutdown",
    )
}

/// Cancel a previously scheduled shutdown. Fails if none is pending.
pub fn cancel_shutdown() -> Result<()> {
    run(Platform::current().cancel_command(), "cancel shutdown")
}
