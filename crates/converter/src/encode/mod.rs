//! Encoding modules for autoconvert

pub mod cleanup;
pub mod ffmpeg;
pub mod handbrake;

pub use cleanup::PartialOutputGuard;
pub use ffmpeg::{build_ffmpeg_command, encode_with_ffmpeg, run_ffmpeg, FfmpegPipeline};
pub use handbrake::{
    build_handbrake_command, encode_with_handbrake, run_handbrake, HandbrakeTranscoder,
};

use crate::probe::ProbeError;
use crate::scan::{SourceFile, CONVERTED_MARKER};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Extension of every converted output.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Error type for encoder invocations
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The encoder could not be started
    #[error("failed to start encoder: {0}")]
    Spawn(#[from] std::io::Error),

    /// The encoder exited with non-zero status
    #[error("encoder failed with exit code: {0}")]
    Failed(i32),

    /// The encoder was terminated by signal
    #[error("encoder process was terminated by signal")]
    Terminated,
}

/// Why a single file could not be converted
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("codec probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Outcome of converting one file, with the time it took.
#[derive(Debug)]
pub struct ConversionResult {
    pub outcome: Result<(), ConvertError>,
    pub elapsed: Duration,
}

impl ConversionResult {
    pub fn success(elapsed: Duration) -> Self {
        Self {
            outcome: Ok(()),
            elapsed,
        }
    }

    pub fn failure(error: impl Into<ConvertError>, elapsed: Duration) -> Self {
        Self {
            outcome: Err(error.into()),
            elapsed,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Converts one source file into a web-playable output.
///
/// Implementations never panic on tool failure; every problem is reported
/// through the returned [`ConversionResult`].
pub trait Transcoder {
    /// Encoder name shown in the batch log.
    fn name(&self) -> &'static str;

    fn transcode(&self, source: &SourceFile, output_dir: &Path, dry_run: bool) -> ConversionResult;
}

/// Input and output paths for one encoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl EncodeParams {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            output_path,
        }
    }

    /// Paths for converting `source` into `output_dir`.
    pub fn for_source(source: &SourceFile, output_dir: &Path) -> Self {
        Self::new(source.path().to_path_buf(), output_path(output_dir, source))
    }
}

/// Output location for a source: `<output_dir>/converted_<stem>.mp4`.
pub fn output_path(output_dir: &Path, source: &SourceFile) -> PathBuf {
    output_dir.join(format!(
        "{}{}.{}",
        CONVERTED_MARKER,
        source.stem(),
        OUTPUT_EXTENSION
    ))
}

/// Maps a finished process status to the encoder error contract.
pub(crate) fn check_exit_status(status: ExitStatus) -> Result<(), EncodeError> {
    if status.success() {
        Ok(())
    } else {
        match status.code() {
            Some(code) => Err(EncodeError::Failed(code)),
            None => Err(EncodeError::Terminated),
        }
    }
}
