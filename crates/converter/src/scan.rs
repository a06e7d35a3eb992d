//! Scanner module for discovering source files in the input directory.
//!
//! Only the top level of the input directory is listed. Files are kept when
//! their extension is allow-listed and their name does not carry the
//! converted marker, so a second run never picks up its own results.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// Name prefix given to converted outputs and to finished sources.
pub const CONVERTED_MARKER: &str = "converted_";

/// Errors that abort discovery.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input directory {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A candidate file discovered in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lowercased extension without the leading dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }
}

/// Checks whether a file name already carries the converted marker.
pub fn is_marked(file_name: &str) -> bool {
    file_name.contains(CONVERTED_MARKER)
}

/// Checks if a file has an allow-listed extension (case-insensitive).
///
/// Allow-list entries may be written with or without the leading dot.
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Lists conversion candidates in `input_dir`.
///
/// This function:
/// - Lists the directory without descending into subdirectories
/// - Keeps regular files (symlinks are followed)
/// - Filters by the extension allow-list
/// - Excludes names containing [`CONVERTED_MARKER`]
/// - Preserves the order the filesystem returns
pub fn discover_candidates(
    input_dir: &Path,
    extensions: &[String],
) -> Result<Vec<SourceFile>, ScanError> {
    if !input_dir.is_dir() {
        return Err(ScanError::NotADirectory(input_dir.to_path_buf()));
    }

    let walker = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    let mut candidates = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The listing itself failed
            Err(e) if e.depth() == 0 => return Err(ScanError::Walk(e)),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        if !has_allowed_extension(path, extensions) {
            continue;
        }

        if is_marked(&entry.file_name().to_string_lossy()) {
            continue;
        }

        candidates.push(SourceFile::new(path.to_path_buf()));
    }

    Ok(candidates)
}
