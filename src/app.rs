use crate::cli::{Cli, Commands, RunArgs, TargetArgs};
use anyhow::{Context, Result};
use chrono::Utc;
use sermon_norm::engine::{self, LoudnormStats, NormaliseError, Normaliser, NormaliserParams};
use sermon_norm::ui::{Answer, Console};
use sermon_norm::{config, system};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::Level;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> config::Config {
    config::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        eprintln!("Using built-in defaults.");
        config::Config::default()
    })
}

fn resolve_params(config: &config::Config, targets: &TargetArgs) -> NormaliserParams {
    let mut params = config.normaliser.clone();
    targets.apply(&mut params);
    params
}

pub fn run(cli: Cli) {
    init_logging(cli.verbose);

    // Handle subcommands first
    if let Some(command) = cli.command {
        match command {
            Commands::CheckFfmpeg => handle_check_ffmpeg(),
            Commands::Analyse {
                file,
                targets,
                json,
            } => handle_analyse(file, targets, json),
            Commands::CancelShutdown => handle_cancel_shutdown(),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    let code = handle_normalise(cli.run);
    process::exit(code);
}

fn handle_check_ffmpeg() {
    match engine::ffmpeg_version() {
        Ok(version) => println!("ffmpeg found: {}", version),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }

    if engine::loudnorm_filter_available() {
        println!("loudnorm filter: available");
    } else {
        eprintln!("Error: this ffmpeg build has no loudnorm filter");
        process::exit(1);
    }

    match engine::ffprobe_version() {
        Ok(version) => println!("ffprobe found: {}", version),
        // Only the progress percentage depends on ffprobe
        Err(e) => println!("ffprobe missing, progress will not show a percentage: {:#}", e),
    }
}

fn print_stats(stats: &LoudnormStats) {
    println!("  Input Loudness: {} LUFS", stats.input_i);
    println!("  Input True Peak: {} dBTP", stats.input_tp);
    println!("  Input Loudness Range: {} LU", stats.input_lra);
}

fn handle_analyse(file: PathBuf, targets: TargetArgs, json: bool) {
    let config = load_config();
    let params = resolve_params(&config, &targets);

    let result = Normaliser::new(params).and_then(|n| n.analyse(&file));
    match result {
        Ok(stats) => {
            if json {
                match serde_json::to_string_pretty(&stats) {
                    Ok(s) => println!("{}", s),
                    Err(e) => {
                        eprintln!("Error: {:#}", e);
                        process::exit(1);
                    }
                }
            } else {
                println!("{}", file.display());
                print_stats(&stats);
                println!("  Threshold: {} LUFS", stats.input_thresh);
                println!("  Target Offset: {} LU", stats.target_offset);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            process::exit(1);
        }
    }
}

fn handle_cancel_shutdown() {
    match system::cancel_shutdown() {
        Ok(()) => println!("Shutdown cancelled."),
        Err(e) => {
            eprintln!("No shutdown to cancel ({:#})", e);
            process::exit(1);
        }
    }
}

fn handle_init_config() {
    let path = match config::Config::config_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if path.exists() {
        match config::Config::load() {
            Ok(cfg) => {
                println!("Config loaded successfully from {}", path.display());
                println!("{:#?}", cfg);
            }
            Err(e) => {
                // Leave a broken file alone, the operator may want to fix it by hand
                eprintln!("Config invalid: {:#}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Creating default config...");
        if let Err(err) = config::Config::ensure_default() {
            eprintln!("Failed to save default config: {:#}", err);
            process::exit(1);
        }
        println!("Default config saved to {}", path.display());
    }
}

/// How the end-of-run shutdown is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownMode {
    Ask,
    Always,
    Never,
}

impl ShutdownMode {
    fn from_args(args: &RunArgs) -> Self {
        if args.shutdown {
            ShutdownMode::Always
        } else if args.no_shutdown {
            ShutdownMode::Never
        } else {
            ShutdownMode::Ask
        }
    }
}

fn console(slot: &mut Option<Console>) -> &Console {
    slot.get_or_insert_with(Console::stdin)
}

fn handle_normalise(args: RunArgs) -> i32 {
    let config = load_config();
    let pause_on_exit = config.ui.pause_on_exit && !args.no_pause && !args.dry_run;

    // Created lazily: the picker needs the terminal to itself
    let mut input_lines: Option<Console> = None;

    let code = match normalise_interactive(&args, &config, &mut input_lines) {
        Ok(code) => code,
        Err(e) => report_error(&e),
    };

    if pause_on_exit {
        console(&mut input_lines).pause("\nPress Enter to exit...");
    }
    code
}

/// How a failed run is reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    /// Plain `ERROR:` line, nothing else to undo
    MissingInput,
    /// Full error chain plus a shutdown cancel attempt
    Unexpected,
}

fn classify_error(e: &anyhow::Error) -> ErrorKind {
    match e.downcast_ref::<NormaliseError>() {
        Some(NormaliseError::InputNotFound(_)) => ErrorKind::MissingInput,
        _ => ErrorKind::Unexpected,
    }
}

fn report_error(e: &anyhow::Error) -> i32 {
    match classify_error(e) {
        ErrorKind::MissingInput => {
            println!("\nERROR: {}", e);
        }
        ErrorKind::Unexpected => {
            println!("\nERROR: An unexpected error occurred:");
            println!("{:#}", e);
            // A shutdown left over from an earlier run must not catch the operator mid-fix
            match system::cancel_shutdown() {
                Ok(()) => println!("Shutdown cancelled."),
                Err(err) => tracing::debug!("no shutdown cancelled: {:#}", err),
            }
        }
    }
    1
}

fn normalise_interactive(
    args: &RunArgs,
    config: &config::Config,
    input_lines: &mut Option<Console>,
) -> Result<i32> {
    println!("{}", rule());
    println!("NHBC Sermon Audio Normaliser");
    println!("{}", rule());
    println!();

    if !args.dry_run {
        if let Err(e) = engine::ffmpeg_version() {
            println!("ERROR: FFmpeg is not installed or not in PATH.");
            println!("Please install FFmpeg first: https://ffmpeg.org/download.html");
            tracing::debug!("ffmpeg check failed: {:#}", e);
            return Ok(1);
        }
    }

    let params = resolve_params(config, &args.targets);
    let extra_args = engine::parse_extra_args(
        args.ffmpeg_args
            .as_deref()
            .unwrap_or(config.output.extra_args.as_str()),
    );
    let overwrite = args.overwrite || config.output.overwrite;
    let normaliser = Normaliser::new(params)?
        .with_overwrite(overwrite)
        .with_extra_args(extra_args);

    // Select input file
    let input = match &args.input {
        Some(path) => path.clone(),
        None => {
            println!("Step 1: Select the sermon video/audio file to normalise...");
            let start = config
                .ui
                .start_directory()
                .filter(|dir| dir.is_dir())
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from("."));
            match sermon_norm::ui::pick_file(&start, "Select Sermon File")
                .context("File picker failed")?
            {
                Some(path) => path,
                None => {
                    println!("No file selected. Exiting...");
                    return Ok(0);
                }
            }
        }
    };

    println!("Selected: {}", display_name(&input));
    println!();

    let output = args.output.clone().unwrap_or_else(|| {
        engine::derive_output_path(&input, &config.output.naming(), Utc::now())
    });

    if args.dry_run {
        print_dry_run(&normaliser, &input, &output);
        return Ok(0);
    }

    println!("Output will be saved to: {}", display_name(&output));
    println!();

    println!("{}", rule());
    println!("Ready to start normalisation process");
    println!("{}", rule());
    println!("Input:  {}", input.display());
    println!("Output: {}", output.display());
    println!();
    println!("Settings:");
    for line in normaliser.params().summary_lines() {
        println!("  - {}", line);
    }
    println!();

    if !args.yes && !console(input_lines).ask("Continue? (y/n): ") {
        println!("Cancelled by user.");
        return Ok(0);
    }

    println!();
    println!("{}", rule());
    println!("Starting normalisation process...");
    println!("{}", rule());

    let log_path = engine::session_log_path(&output);
    engine::log_session(
        &log_path,
        &format!(
            "=== Normalising ===\n{}\n-> {}\n{}",
            input.display(),
            output.display(),
            normaliser.params().summary_lines().join(", ")
        ),
    );

    println!("Pass 1: Analysing audio levels...");
    let stats = normaliser.analyse(&input).inspect_err(|e| {
        engine::log_session(&log_path, &format!("Analysis failed: {}", e));
    })?;
    print_stats(&stats);
    println!();
    engine::log_session(
        &log_path,
        &format!(
            "Measured: I={} TP={} LRA={} thresh={} offset={}",
            stats.input_i, stats.input_tp, stats.input_lra, stats.input_thresh, stats.target_offset
        ),
    );

    println!("Pass 2: Applying normalisation...");
    normaliser
        .normalise(&input, &output, &stats, |parser, pct| {
            print!("\rProgress: {:5.1}%", pct);
            if let Some(speed) = parser.speed {
                print!(" | Speed: {:.1}x", speed);
            }
            std::io::stdout().flush().ok();
        })
        .inspect_err(|e| {
            engine::log_session(&log_path, &format!("Normalise failed: {}", e));
        })?;
    println!();
    engine::log_session(&log_path, &format!("Done: {}", output.display()));

    println!();
    println!("{}", rule());
    println!("SUCCESS! Normalisation complete.");
    println!("{}", rule());
    println!("Output file: {}", output.display());
    println!();

    decide_shutdown(args, config, input_lines);
    Ok(0)
}

/// Whether to shut down, given the mode and the prompt's answer (`None` when not asked)
fn should_shut_down(mode: ShutdownMode, answer: Option<Answer>, on_timeout: bool) -> bool {
    match mode {
        ShutdownMode::Never => false,
        ShutdownMode::Always => true,
        ShutdownMode::Ask => match answer {
            Some(Answer::Yes) => true,
            Some(Answer::No) => false,
            Some(Answer::NoAnswer) | None => on_timeout,
        },
    }
}

fn decide_shutdown(args: &RunArgs, config: &config::Config, input_lines: &mut Option<Console>) {
    let delay = args
        .shutdown_delay
        .unwrap_or(config.shutdown.delay_seconds);
    let on_timeout = config.shutdown.on_timeout;

    let mode = ShutdownMode::from_args(args);
    let answer = (mode == ShutdownMode::Ask).then(|| {
        let timeout = Duration::from_secs(config.shutdown.prompt_timeout_seconds);
        console(input_lines).ask_with_timeout("Shutdown computer now? (y/n): ", timeout)
    });

    let shut_down = should_shut_down(mode, answer, on_timeout);
    match (answer, shut_down) {
        (Some(Answer::No), _) => println!("\nShutdown cancelled. You can close this window."),
        (Some(Answer::NoAnswer), true) => {
            println!("\nNo answer received. Automatic shutdown assumed.")
        }
        (Some(Answer::NoAnswer), false) => {
            println!("\nNo answer received. Leaving the computer on.")
        }
        _ => {}
    }

    if !shut_down {
        return;
    }

    match system::schedule_shutdown(delay) {
        Ok(()) => {
            println!("\nShutting down in {} seconds...", delay);
            println!("Run 'sermon-norm cancel-shutdown' to cancel the shutdown.");
        }
        Err(e) => println!("Failed to schedule shutdown: {:#}", e),
    }
}

fn print_dry_run(normaliser: &Normaliser, input: &Path, output: &Path) {
    let params = normaliser.params();
    println!("Pass 1 (analysis):");
    println!(
        "  {}",
        engine::format_cmd(&engine::build_analysis_cmd(input, params))
    );

    // Real values come from pass 1; show the shape with zeros
    let placeholder = engine::Measurement {
        input_i: 0.0,
        input_tp: 0.0,
        input_lra: 0.0,
        input_thresh: 0.0,
        target_offset: 0.0,
    };
    println!("Pass 2 (normalise, measured_* filled in from pass 1):");
    println!(
        "  {}",
        engine::format_cmd(&engine::build_normalise_cmd(
            input,
            output,
            params,
            &placeholder,
            false,
            &[],
        ))
    );
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
