//! Batch orchestrator for autoconvert
//!
//! Enumerates candidates, converts them one at a time, finalizes successful
//! sources and reports a summary. A failure on one file never stops the
//! batch.

use crate::config::Config;
use crate::elapsed::format_duration;
use crate::encode::{FfmpegPipeline, HandbrakeTranscoder, Transcoder};
use crate::finalize::{finalize_source, FinalizeError};
use crate::scan::{discover_candidates, ScanError, SourceFile};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

/// Error type for batch runs
#[derive(Debug, Error)]
pub enum BatchError {
    /// Candidates could not be listed, so nothing was processed
    #[error("Discovery failed: {0}")]
    Scan(#[from] ScanError),
}

/// Options for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for sources
    pub input_dir: PathBuf,
    /// Directory receiving converted outputs
    pub output_dir: PathBuf,
    /// Simulate: no encoder runs, no rename, no delete
    pub dry_run: bool,
    /// Delete the marked source after a successful, non-dry-run conversion
    pub delete_source: bool,
    /// Use HandBrakeCLI instead of the codec-aware ffmpeg pipeline
    pub handbrake: bool,
    /// Allow-listed source extensions
    pub extensions: Vec<String>,
}

impl BatchOptions {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            dry_run: false,
            delete_source: false,
            handbrake: false,
            extensions: vec![".mkv".to_string()],
        }
    }
}

/// Result of a batch run, lists in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Emit the end-of-run report.
    pub fn log(&self) {
        info!(
            "Finished processing {} files in {}",
            self.total(),
            format_duration(self.elapsed)
        );
        info!("Failed: {:?}", self.failed);
        info!("Succeeded: {:?}", self.succeeded);
    }
}

/// Chooses the transcoder for a run.
pub fn select_transcoder(config: &Config, handbrake: bool) -> Box<dyn Transcoder> {
    if handbrake {
        Box::new(HandbrakeTranscoder::from_config(config))
    } else {
        Box::new(FfmpegPipeline::from_config(config))
    }
}

/// Run a batch over every candidate in the input directory.
///
/// Files are processed strictly in discovery order. A file lands in exactly
/// one of the summary lists: `succeeded` when the conversion and the
/// finalize step both worked, `failed` otherwise.
///
/// # Errors
/// Only a failure to list the input directory is returned; every per-file
/// problem is logged and recorded in the summary.
pub fn run_batch(
    options: &BatchOptions,
    transcoder: &dyn Transcoder,
) -> Result<BatchSummary, BatchError> {
    info!("Working with input directory {}", options.input_dir.display());
    info!("Outputting results to {}", options.output_dir.display());
    info!("Option delete source files == {}", options.delete_source);
    if options.dry_run {
        info!("Dry run: no files will be converted, renamed or deleted");
    }

    let candidates = discover_candidates(&options.input_dir, &options.extensions)?;

    info!("Found {} unconverted files", candidates.len());
    debug!(
        "Files: {:?}",
        candidates.iter().map(SourceFile::file_name).collect::<Vec<_>>()
    );

    info!("Using {} to convert videos", transcoder.name());

    let start = Instant::now();
    let mut summary = BatchSummary::default();

    for source in &candidates {
        let name = source.file_name();
        match process_file(options, transcoder, source) {
            Ok(()) => summary.succeeded.push(name),
            Err(FileFailure::Conversion) => summary.failed.push(name),
            Err(FileFailure::Finalize(e)) => {
                error!("Converted {} but could not finalize the source: {}", name, e);
                summary.failed.push(name);
            }
        }
    }

    summary.elapsed = start.elapsed();
    summary.log();

    Ok(summary)
}

/// Why one file ended up in the failed list.
enum FileFailure {
    /// Already logged by the transcoder
    Conversion,
    Finalize(FinalizeError),
}

fn process_file(
    options: &BatchOptions,
    transcoder: &dyn Transcoder,
    source: &SourceFile,
) -> Result<(), FileFailure> {
    let result = transcoder.transcode(source, &options.output_dir, options.dry_run);
    if !result.succeeded() {
        return Err(FileFailure::Conversion);
    }

    if options.dry_run {
        return Ok(());
    }

    match finalize_source(source.path(), options.delete_source) {
        Ok(Some(marked)) => debug!("Marked source as {}", marked.display()),
        Ok(None) => info!("Deleted source {}", source.file_name()),
        Err(e) => return Err(FileFailure::Finalize(e)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{output_path, ConversionResult, EncodeError};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::TempDir;

    /// Transcoder that fails for chosen file names and records every call.
    #[derive(Default)]
    struct SimulatedTranscoder {
        failing: BTreeSet<String>,
        write_output: bool,
        remove_source: bool,
        calls: RefCell<Vec<(String, bool)>>,
    }

    impl SimulatedTranscoder {
        fn failing<I: IntoIterator<Item = String>>(names: I) -> Self {
            Self {
                failing: names.into_iter().collect(),
                ..Self::default()
            }
        }

        fn called_names(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(name, _)| name.clone()).collect()
        }
    }

    impl Transcoder for SimulatedTranscoder {
        fn name(&self) -> &'static str {
            "simulated"
        }

        fn transcode(
            &self,
            source: &SourceFile,
            output_dir: &Path,
            dry_run: bool,
        ) -> ConversionResult {
            let name = source.file_name();
            self.calls.borrow_mut().push((name.clone(), dry_run));

            if self.failing.contains(&name) {
                return ConversionResult::failure(EncodeError::Failed(1), Duration::ZERO);
            }
            if self.write_output && !dry_run {
                File::create(output_path(output_dir, source)).unwrap();
            }
            if self.remove_source {
                fs::remove_file(source.path()).unwrap();
            }
            ConversionResult::success(Duration::ZERO)
        }
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    fn setup(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            File::create(temp_dir.path().join(name)).unwrap();
        }
        temp_dir
    }

    fn options_for(dir: &Path) -> BatchOptions {
        BatchOptions::new(dir.to_path_buf(), dir.to_path_buf())
    }

    #[test]
    fn test_success_marks_source_in_place() {
        let temp_dir = setup(&["a.mkv", "b.mkv"]);
        let transcoder = SimulatedTranscoder::default();

        let summary = run_batch(&options_for(temp_dir.path()), &transcoder).unwrap();

        assert_eq!(sorted(summary.succeeded.clone()), vec!["a.mkv", "b.mkv"]);
        assert!(summary.failed.is_empty());
        assert_eq!(
            dir_listing(temp_dir.path()),
            vec!["converted_a.mkv", "converted_b.mkv"]
        );
    }

    #[test]
    fn test_failed_conversion_leaves_source_untouched() {
        let temp_dir = setup(&["good.mkv", "bad.mkv"]);
        let transcoder = SimulatedTranscoder::failing(["bad.mkv".to_string()]);
        let mut options = options_for(temp_dir.path());
        options.delete_source = true;

        let summary = run_batch(&options, &transcoder).unwrap();

        assert_eq!(summary.succeeded, vec!["good.mkv"]);
        assert_eq!(summary.failed, vec!["bad.mkv"]);
        assert_eq!(dir_listing(temp_dir.path()), vec!["bad.mkv"]);
    }

    #[test]
    fn test_dry_run_mutates_nothing_and_reports_success() {
        let temp_dir = setup(&["a.mkv", "b.mkv", "c.mkv"]);
        let transcoder = SimulatedTranscoder {
            write_output: true,
            ..SimulatedTranscoder::default()
        };
        let mut options = options_for(temp_dir.path());
        options.dry_run = true;
        options.delete_source = true;

        let before = dir_listing(temp_dir.path());
        let summary = run_batch(&options, &transcoder).unwrap();

        assert_eq!(dir_listing(temp_dir.path()), before);
        assert_eq!(sorted(summary.succeeded), vec!["a.mkv", "b.mkv", "c.mkv"]);
        assert!(summary.failed.is_empty());
        assert!(transcoder.calls.borrow().iter().all(|(_, dry)| *dry));
    }

    #[test]
    fn test_delete_source_leaves_only_the_output() {
        let temp_dir = setup(&["film.mkv"]);
        let transcoder = SimulatedTranscoder {
            write_output: true,
            ..SimulatedTranscoder::default()
        };
        let mut options = options_for(temp_dir.path());
        options.delete_source = true;

        let summary = run_batch(&options, &transcoder).unwrap();

        assert_eq!(summary.succeeded, vec!["film.mkv"]);
        let listing = dir_listing(temp_dir.path());
        assert!(!listing.contains(&"film.mkv".to_string()));
        assert_eq!(listing, vec!["converted_film.mp4"]);
    }

    #[test]
    fn test_finalize_failure_counts_as_failed_and_batch_continues() {
        let temp_dir = setup(&["vanishing.mkv"]);
        let transcoder = SimulatedTranscoder {
            remove_source: true,
            ..SimulatedTranscoder::default()
        };

        let summary = run_batch(&options_for(temp_dir.path()), &transcoder).unwrap();

        assert!(summary.succeeded.is_empty());
        assert_eq!(summary.failed, vec!["vanishing.mkv"]);
    }

    #[test]
    fn test_existing_marked_name_fails_the_file() {
        let temp_dir = setup(&["film.mkv", "converted_film.mkv"]);
        let transcoder = SimulatedTranscoder::default();

        let summary = run_batch(&options_for(temp_dir.path()), &transcoder).unwrap();

        assert_eq!(summary.failed, vec!["film.mkv"]);
        assert_eq!(
            dir_listing(temp_dir.path()),
            vec!["converted_film.mkv", "film.mkv"]
        );
    }

    #[test]
    fn test_only_allow_listed_files_reach_transcoder() {
        let temp_dir = setup(&["a.mkv", "b.mp4", "c.avi", "readme.txt", "converted_d.mkv"]);
        let transcoder = SimulatedTranscoder::default();

        let summary = run_batch(&options_for(temp_dir.path()), &transcoder).unwrap();

        assert_eq!(transcoder.called_names(), vec!["a.mkv"]);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let temp_dir = setup(&["a.mkv", "b.mkv"]);
        let first = SimulatedTranscoder::default();
        run_batch(&options_for(temp_dir.path()), &first).unwrap();

        let second = SimulatedTranscoder::default();
        let summary = run_batch(&options_for(temp_dir.path()), &second).unwrap();

        assert!(second.called_names().is_empty());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_missing_input_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let options = options_for(&temp_dir.path().join("missing"));

        let result = run_batch(&options, &SimulatedTranscoder::default());
        assert!(matches!(result, Err(BatchError::Scan(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_ffmpeg_pipeline_end_to_end_with_stub_tools() {
        let input = setup(&["film.mkv"]);
        let output = TempDir::new().unwrap();
        let pipeline = FfmpegPipeline::new(PathBuf::from("true"), PathBuf::from("true"));
        let options = BatchOptions::new(input.path().to_path_buf(), output.path().to_path_buf());

        let summary = run_batch(&options, &pipeline).unwrap();

        assert_eq!(summary.succeeded, vec!["film.mkv"]);
        assert_eq!(dir_listing(input.path()), vec!["converted_film.mkv"]);
    }

    #[test]
    fn test_select_transcoder_dry_run_paths() {
        let temp_dir = setup(&["film.mkv"]);
        let mut config = Config::default();
        config.tools.ffprobe = PathBuf::from("/nonexistent/ffprobe");
        config.tools.ffmpeg = PathBuf::from("/nonexistent/ffmpeg");
        config.tools.handbrake = PathBuf::from("/nonexistent/HandBrakeCLI");

        for handbrake in [false, true] {
            let mut options = options_for(temp_dir.path());
            options.dry_run = true;
            options.handbrake = handbrake;

            let transcoder = select_transcoder(&config, handbrake);
            let expected_name = if handbrake { "HandBrakeCLI" } else { "ffmpeg" };
            assert_eq!(transcoder.name(), expected_name);
            let summary = run_batch(&options, transcoder.as_ref()).unwrap();
            assert_eq!(summary.succeeded, vec!["film.mkv"]);
        }
        assert_eq!(dir_listing(temp_dir.path()), vec!["film.mkv"]);
    }

    #[test]
    fn test_summary_total() {
        let summary = BatchSummary {
            succeeded: vec!["a.mkv".to_string()],
            failed: vec!["b.mkv".to_string(), "c.mkv".to_string()],
            elapsed: Duration::from_secs(5),
        };
        assert_eq!(summary.total(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        // With K simulated successes out of N, every file lands in exactly one list
        #[test]
        fn prop_every_file_in_exactly_one_list(
            files in proptest::collection::btree_map("[a-z0-9]{1,8}", proptest::bool::ANY, 0..10),
        ) {
            let temp_dir = TempDir::new().unwrap();
            let mut failing = Vec::new();
            for (base, fails) in &files {
                let name = format!("{}.mkv", base);
                File::create(temp_dir.path().join(&name)).unwrap();
                if *fails {
                    failing.push(name);
                }
            }
            let transcoder = SimulatedTranscoder::failing(failing.clone());

            let summary = run_batch(&options_for(temp_dir.path()), &transcoder).unwrap();

            let n = files.len();
            let k = n - failing.len();
            prop_assert_eq!(summary.succeeded.len(), k);
            prop_assert_eq!(summary.failed.len(), n - k);
            prop_assert_eq!(sorted(summary.failed.clone()), sorted(failing));

            let succeeded: BTreeSet<_> = summary.succeeded.iter().collect();
            let failed: BTreeSet<_> = summary.failed.iter().collect();
            prop_assert!(succeeded.is_disjoint(&failed));

            // Lists follow processing order
            let processed = transcoder.called_names();
            let in_order: Vec<&String> =
                processed.iter().filter(|n| succeeded.contains(n)).collect();
            let reported: Vec<&String> = summary.succeeded.iter().collect();
            prop_assert_eq!(in_order, reported);
        }
    }
}
