// Two-pass loudness normalisation: measure, then re-encode with the measurement

use super::cmd::{build_analysis_cmd, build_normalise_cmd, format_cmd};
use super::error::{NormaliseError, Pass, stderr_tail};
use super::ffmpeg_info::probe_duration;
use super::loudnorm::{LoudnormStats, extract_loudnorm_json};
use super::params::NormaliserParams;
use super::progress::ProgressParser;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, info};

/// Lines of ffmpeg stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct Normaliser {
    params: NormaliserParams,
    overwrite: bool,
    extra_args: Vec<String>,
}

impl Normaliser {
    /// Create a normaliser; the parameters are validated up front
    pub fn new(params: NormaliserParams) -> Result<Self, NormaliseError> {
        params.validate().map_err(NormaliseError::InvalidParams)?;
        Ok(Self {
            params,
            overwrite: false,
            extra_args: Vec::new(),
        })
    }

    /// Allow pass 2 to replace an existing output file
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Extra ffmpeg output arguments appended to pass 2
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn params(&self) -> &NormaliserParams {
        &self.params
    }

    /// Pass 1: run loudnorm in measuring mode and parse its JSON report
    pub fn analyse(&self, input: &Path) -> Result<LoudnormStats, NormaliseError> {
        ensure_input(input)?;

        let mut cmd = build_analysis_cmd(input, &self.params);
        debug!(command = %format_cmd(&cmd), "running analysis pass");

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(NormaliseError::Spawn)?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(NormaliseError::FfmpegFailed {
                pass: Pass::Analysis,
                status: output.status,
                stderr_tail: stderr_tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        let stats = extract_loudnorm_json(&stderr)?;
        // Reject unusable numbers now rather than halfway through pass 2
        stats.measurement()?;

        info!(
            input_i = %stats.input_i,
            input_tp = %stats.input_tp,
            input_lra = %stats.input_lra,
            input_thresh = %stats.input_thresh,
            target_offset = %stats.target_offset,
            "measured loudness"
        );

        Ok(stats)
    }

    /// Pass 2: copy video, re-encode audio through loudnorm using `stats`.
    /// `on_progress` receives the parser and a 0-100 percentage.
    pub fn normalise<F>(
        &self,
        input: &Path,
        output: &Path,
        stats: &LoudnormStats,
        mut on_progress: F,
    ) -> Result<(), NormaliseError>
    where
        F: FnMut(&ProgressParser, f64),
    {
        ensure_input(input)?;
        self.ensure_output(input, output)?;

        let measured = stats.measurement()?;
        let duration_s = probe_duration(input).ok();

        let mut cmd = build_normalise_cmd(
            input,
            output,
            &self.params,
            &measured,
            self.overwrite,
            &self.extra_args,
        );
        debug!(command = %format_cmd(&cmd), ?duration_s, "running normalise pass");

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(NormaliseError::Spawn)?;

        let io_err = |source| NormaliseError::Io {
            pass: Pass::Normalise,
            source,
        };

        // Drain stderr on its own thread so a chatty ffmpeg cannot block on a full pipe
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io_err(std::io::Error::other("stderr not captured")))?;
        let stderr_thread = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_err(std::io::Error::other("stdout not captured")))?;
        let mut parser = ProgressParser::new();
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if parser.parse_line(&line) {
                on_progress(&parser, parser.progress_pct(duration_s));
            }
        }

        let status = child.wait().map_err(io_err)?;
        let stderr_output = stderr_thread.join().unwrap_or_default();

        if !status.success() {
            return Err(NormaliseError::FfmpegFailed {
                pass: Pass::Normalise,
                status,
                stderr_tail: stderr_tail(&stderr_output, STDERR_TAIL_LINES),
            });
        }

        info!(output = %output.display(), "normalised output written");
        Ok(())
    }

    /// Both passes back to back. Returns the pass 1 measurement.
    pub fn run<F>(
        &self,
        input: &Path,
        output: &Path,
        on_progress: F,
    ) -> Result<LoudnormStats, NormaliseError>
    where
        F: FnMut(&ProgressParser, f64),
    {
        let stats = self.analyse(input)?;
        self.normalise(input, output, &stats, on_progress)?;
        Ok(stats)
    }

    fn ensure_output(&self, input: &Path, output: &Path) -> Result<(), NormaliseError> {
        if same_file(input, output) {
            return Err(NormaliseError::OutputIsInput(output.to_path_buf()));
        }
        if output.exists() && !self.overwrite {
            return Err(NormaliseError::OutputExists(output.to_path_buf()));
        }
        Ok(())
    }
}

fn ensure_input(input: &Path) -> Result<(), NormaliseError> {
    if input.is_file() {
        Ok(())
    } else {
        Err(NormaliseError::InputNotFound(input.to_path_buf()))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
