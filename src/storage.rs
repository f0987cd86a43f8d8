// ABOUTME: Output directory handling with atomic, non-destructive writes
// ABOUTME: Decides write vs skip per target file and honours --force

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of writing one rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    Written,
    SkippedExisting,
}

/// Destination directory of a dump run.
pub struct OutputDir {
    root: PathBuf,
    force: bool,
}

impl OutputDir {
    /// Opens an existing destination directory.
    ///
    /// A missing root is a configuration problem and is reported before anything is written.
    pub fn open(root: PathBuf, force: bool) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "destination directory {} does not exist",
                root.display()
            )));
        }

        Ok(OutputDir { root, force })
    }

    pub fn target(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `content` to `relative` unless the file exists and force is off.
    pub fn write(&self, relative: &Path, content: &str) -> Result<WriteDecision> {
        let path = self.target(relative);

        if path.exists() && !self.force {
            tracing::debug!(path = %path.display(), "file exists, skipping");
            return Ok(WriteDecision::SkippedExisting);
        }

        write_atomic(&path, content.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "file written");
        Ok(WriteDecision::Written)
    }
}

/// Writes through a temporary sibling file and renames it over `path`.
///
/// The rename stays on one filesystem, so readers see either the old file or the new one.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use rand::Rng;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let random: u32 = rand::thread_rng().gen();
    let tmp_path = parent.join(format!(".{:x}.part", random));

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
