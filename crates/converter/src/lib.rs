//! autoconvert
//!
//! Batch-converts MKV files into web-playable MP4 files, re-encoding only the
//! streams that browsers cannot play as-is.

pub mod batch;
pub mod elapsed;
pub mod encode;
pub mod finalize;
pub mod logging;
pub mod plan;
pub mod probe;
pub mod scan;
pub mod startup;

pub use autoconvert_config as config;
pub use autoconvert_config::Config;
pub use batch::{run_batch, select_transcoder, BatchError, BatchOptions, BatchSummary};
pub use elapsed::{format_duration, format_elapsed};
pub use encode::{
    build_ffmpeg_command, build_handbrake_command, ConversionResult, ConvertError, EncodeError,
    EncodeParams, FfmpegPipeline, HandbrakeTranscoder, Transcoder,
};
pub use finalize::{finalize_source, mark_converted, FinalizeError};
pub use logging::{build_subscriber, LogLevel, LoggingError};
pub use plan::{plan_encode, EncodeMode};
pub use probe::{probe_codecs, CodecPair, ProbeError};
pub use scan::{discover_candidates, ScanError, SourceFile, CONVERTED_MARKER};
pub use startup::{run_startup_checks, StartupError};
