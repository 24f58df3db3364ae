// Normalisation engine - independent of the console and picker UI

pub mod cmd;
pub mod error;
pub mod ffmpeg_info;
pub mod log;
pub mod loudnorm;
pub mod normalise;
pub mod output;
pub mod params;
pub mod progress;

pub use cmd::{build_analysis_cmd, build_normalise_cmd, format_cmd, parse_extra_args};
pub use error::{NormaliseError, Pass};
pub use ffmpeg_info::{
    ffmpeg_version, ffprobe_version, loudnorm_filter_available, probe_duration,
};
pub use log::{log_session, session_log_path, write_session_log};
pub use loudnorm::{LoudnormStats, Measurement, extract_loudnorm_json};
pub use normalise::Normaliser;
pub use output::{OutputNaming, derive_output_path};
pub use params::{NormaliserParams, ValidationError};
pub use progress::ProgressParser;
