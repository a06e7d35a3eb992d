//! CLI entry point for autoconvert
//!
//! Parses command line arguments, sets up logging and runs one batch.

use autoconvert::{
    build_subscriber, run_batch, run_startup_checks, select_transcoder, BatchOptions, Config,
    LogLevel,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Convert MKV files to MP4 for web playback
#[derive(Parser, Debug)]
#[command(name = "autoconvert")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The directory with files to convert
    inputdir: PathBuf,

    /// The directory where the converted files will go
    outputdir: PathBuf,

    /// Set the application log level
    #[arg(long, default_value = "INFO")]
    log_level: LogLevel,

    /// Do not do any conversion but show what will be done instead
    #[arg(long)]
    dry_run: bool,

    /// Delete the source file after conversion complete
    #[arg(long = "delete_source", alias = "delete-source")]
    delete_source: bool,

    /// Use HandBrakeCLI to convert videos instead of ffmpeg
    #[arg(long)]
    handbrake: bool,

    /// Path to a configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file location (overrides the configuration)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Skip external tool availability checks
    #[arg(long, default_value = "false")]
    skip_checks: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::from_env(),
    };

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| config.logging.file.clone());

    let (subscriber, _guard) = match build_subscriber(args.log_level, &log_file) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::subscriber::with_default(subscriber, || run(&args, &config))
}

fn run(args: &Args, config: &Config) -> ExitCode {
    info!("Logger initialized with log level: {}", args.log_level);

    let options = BatchOptions {
        input_dir: args.inputdir.clone(),
        output_dir: args.outputdir.clone(),
        dry_run: args.dry_run,
        delete_source: args.delete_source,
        handbrake: args.handbrake,
        extensions: config.scan.extensions.clone(),
    };

    if args.skip_checks {
        info!("Skipping tool availability checks (--skip-checks enabled)");
    }
    let problems = run_startup_checks(config, &options, args.skip_checks);
    if !problems.is_empty() {
        warn!(
            "{} startup check(s) failed; affected files will be reported as failed",
            problems.len()
        );
    }

    let transcoder = select_transcoder(config, options.handbrake);

    // Per-file failures are reported in the summary, not the exit code.
    // Only an input directory that cannot be listed ends the run with failure.
    match run_batch(&options, transcoder.as_ref()) {
        Ok(_summary) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Batch aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["autoconvert", "/in", "/out"]).unwrap();
        assert_eq!(args.inputdir, PathBuf::from("/in"));
        assert_eq!(args.outputdir, PathBuf::from("/out"));
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.dry_run);
        assert!(!args.delete_source);
        assert!(!args.handbrake);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "autoconvert",
            "/in",
            "/out",
            "--log-level",
            "DEBUG",
            "--dry-run",
            "--delete_source",
            "--handbrake",
        ])
        .unwrap();

        assert_eq!(args.log_level, LogLevel::Debug);
        assert!(args.dry_run);
        assert!(args.delete_source);
        assert!(args.handbrake);
    }

    #[test]
    fn test_delete_source_alias() {
        let args = Args::try_parse_from(["autoconvert", "/in", "/out", "--delete-source"]).unwrap();
        assert!(args.delete_source);
    }

    #[test]
    fn test_rejects_unknown_level_and_missing_dirs() {
        assert!(
            Args::try_parse_from(["autoconvert", "/in", "/out", "--log-level", "LOUD"]).is_err()
        );
        assert!(Args::try_parse_from(["autoconvert", "/in"]).is_err());
    }
}
