//! Finalizer module for marking and removing converted sources.
//!
//! After a successful conversion the source is renamed in place with the
//! converted marker, so discovery skips it from then on, and is optionally
//! deleted.

use crate::scan::CONVERTED_MARKER;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while finalizing a source file.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// Failed to rename the source to its marked name.
    #[error("failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// The marked name is already taken by another file.
    #[error("cannot mark {}: {} already exists", .from.display(), .to.display())]
    AlreadyMarked { from: PathBuf, to: PathBuf },

    /// Failed to delete the marked source.
    #[error("failed to delete {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Marked name for a source: `<dir>/converted_<file_name>`.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use autoconvert::finalize::marked_path;
///
/// let marked = marked_path(Path::new("/media/in/film.mkv"));
/// assert_eq!(marked, PathBuf::from("/media/in/converted_film.mkv"));
/// ```
pub fn marked_path(source: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(CONVERTED_MARKER);
    if let Some(file_name) = source.file_name() {
        name.push(file_name);
    }
    source.with_file_name(name)
}

/// Renames the source in place to its marked name.
///
/// Returns the new path. An existing file at the marked name is never
/// replaced.
pub fn mark_converted(source: &Path) -> Result<PathBuf, FinalizeError> {
    let target = marked_path(source);
    if target.exists() {
        return Err(FinalizeError::AlreadyMarked {
            from: source.to_path_buf(),
            to: target,
        });
    }
    fs::rename(source, &target).map_err(|e| FinalizeError::Rename {
        from: source.to_path_buf(),
        to: target.clone(),
        source: e,
    })?;
    Ok(target)
}

/// Deletes a (marked) source file.
pub fn delete_source(path: &Path) -> Result<(), FinalizeError> {
    fs::remove_file(path).map_err(|e| FinalizeError::Delete {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Marks a successfully converted source and, if requested, deletes it.
///
/// Returns the marked path, or `None` when the source was deleted.
pub fn finalize_source(source: &Path, delete: bool) -> Result<Option<PathBuf>, FinalizeError> {
    let marked = mark_converted(source)?;
    if delete {
        delete_source(&marked)?;
        return Ok(None);
    }
    Ok(Some(marked))
}
