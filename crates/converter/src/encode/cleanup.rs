//! Removal of partial encoder output.

use std::fs;
use std::path::{Path, PathBuf};

/// Deletes an encoder's output file when dropped, unless disarmed.
///
/// The guard only arms when the output did not exist at creation time, so a
/// file that was already there before the encoder ran is never removed.
#[derive(Debug)]
pub struct PartialOutputGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialOutputGuard {
    pub fn arm(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: !path.exists(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Keep the output; call once the encoder has succeeded.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutputGuard {
    fn drop(&mut self) {
        if self.armed {
            // Nothing useful can be done if removal fails
            let _ = fs::remove_file(&self.path);
        }
    }
}
