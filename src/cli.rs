use clap::{Args, Parser, Subcommand};
use sermon_norm::engine::NormaliserParams;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sermon-norm", version)]
#[command(about = "Two-pass loudness normalisation of sermon recordings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Show debug logging (commands run, measurements)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Loudness targets and output audio settings (override the config file)
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target integrated loudness in LUFS (-70.0 to -5.0)
    #[arg(long, value_name = "LUFS", allow_negative_numbers = true)]
    pub target_lufs: Option<f64>,

    /// Maximum true peak in dBTP (-9.0 to 0.0)
    #[arg(long, value_name = "DBTP", allow_negative_numbers = true)]
    pub true_peak: Option<f64>,

    /// Target loudness range in LU (1.0 to 50.0)
    #[arg(long, value_name = "LU")]
    pub loudness_range: Option<f64>,

    /// Audio encoder for the output (e.g. aac, libopus)
    #[arg(long, value_name = "CODEC")]
    pub codec: Option<String>,

    /// Audio bitrate for the output (e.g. 192k)
    #[arg(long, value_name = "BITRATE")]
    pub bitrate: Option<String>,

    /// Output sample rate in Hz (0 = let ffmpeg decide)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
}

impl TargetArgs {
    /// Apply command-line overrides on top of configured settings
    pub fn apply(&self, params: &mut NormaliserParams) {
        if let Some(v) = self.target_lufs {
            params.target_lufs = v;
        }
        if let Some(v) = self.true_peak {
            params.true_peak = v;
        }
        if let Some(v) = self.loudness_range {
            params.loudness_range = v;
        }
        if let Some(v) = &self.codec {
            params.audio_codec = v.clone();
        }
        if let Some(v) = &self.bitrate {
            params.audio_bitrate = v.clone();
        }
        if let Some(v) = self.sample_rate {
            params.sample_rate = v;
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Recording to normalise (opens a file picker when omitted)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (defaults to <prefix>_<date>_<suffix>.<ext> next to the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub targets: TargetArgs,

    /// Replace the output file if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Extra ffmpeg output arguments for the normalise pass
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub ffmpeg_args: Option<String>,

    /// Don't ask for confirmation before starting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Shut down after a successful run without asking
    #[arg(long, conflicts_with = "no_shutdown")]
    pub shutdown: bool,

    /// Never shut down, and don't ask
    #[arg(long, conflicts_with = "shutdown")]
    pub no_shutdown: bool,

    /// Seconds before the scheduled shutdown (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub shutdown_delay: Option<u64>,

    /// Print the ffmpeg commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check if ffmpeg and ffprobe are installed and ffmpeg has loudnorm
    CheckFfmpeg,

    /// Measure a file's loudness (pass 1 only) and print the statistics
    Analyse {
        /// Path to the recording
        file: PathBuf,

        #[command(flatten)]
        targets: TargetArgs,

        /// Print the raw loudnorm statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Abort a shutdown scheduled by a previous run
    CancelShutdown,

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
