// Global configuration management

use crate::engine::output::{OutputNaming, offset_from_hours};
use crate::engine::params::NormaliserParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normaliser: NormaliserParams,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Text before the date in the output filename
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Text after the date in the output filename
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Hours east of UTC used to stamp the date (Brisbane = 10)
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Replace an existing output file instead of failing
    #[serde(default)]
    pub overwrite: bool,

    /// Extra ffmpeg output arguments for the normalise pass (shell-style)
    #[serde(default)]
    pub extra_args: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Seconds between scheduling and the machine powering off
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,

    /// How long the shutdown question waits for an answer
    #[serde(default = "default_prompt_timeout_seconds")]
    pub prompt_timeout_seconds: u64,

    /// Shut down when nobody answers the question in time
    #[serde(default = "default_true_config")]
    pub on_timeout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Wait for Enter before the console closes
    #[serde(default = "default_true_config")]
    pub pause_on_exit: bool,

    /// Directory the file picker opens in (empty = current directory)
    #[serde(default)]
    pub start_directory: String,
}

fn default_prefix() -> String {
    "NHBC_Bal".to_string()
}

fn default_suffix() -> String {
    "Normalised_Audio".to_string()
}

fn default_utc_offset_hours() -> i32 {
    10
}

fn default_delay_seconds() -> u64 {
    30
}

fn default_prompt_timeout_seconds() -> u64 {
    120
}

fn default_true_config() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix: default_suffix(),
            utc_offset_hours: default_utc_offset_hours(),
            overwrite: false,
            extra_args: String::new(),
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_delay_seconds(),
            prompt_timeout_seconds: default_prompt_timeout_seconds(),
            on_timeout: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            pause_on_exit: true,
            start_directory: String::new(),
        }
    }
}

impl OutputConfig {
    pub fn naming(&self) -> OutputNaming {
        OutputNaming {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            utc_offset: offset_from_hours(self.utc_offset_hours),
        }
    }
}

impl UiConfig {
    pub fn start_directory(&self) -> Option<PathBuf> {
        if self.start_directory.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(self.start_directory.trim()))
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("sermon-norm")
        } else {
            // Linux, Windows and others
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("sermon-norm")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Parse a config from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            let config: Config = toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?;

            Ok(config)
        } else {
            let config = Config::default();

            // A read-only profile directory must not stop the operator
            if let Err(e) = config.save() {
                tracing::warn!("Could not create default config file: {:#}", e);
                eprintln!(
                    "Using built-in defaults. Run 'sermon-norm init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            let config = Config::default();
            config.save()?;
        }
        Ok(())
    }
}
