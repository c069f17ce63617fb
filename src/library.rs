//! Stamp library: an ordered, directory-backed collection of stamps.
//!
//! The paste tool selects stamps out of this collection by index. Load
//! order is deterministic (sorted by filename) so indices are stable
//! across sessions. A single unreadable `.stamp` file is logged and
//! skipped rather than failing the whole library, since one corrupt
//! entry must not take the editor down.

use crate::stamp::{StampError, TerrainStamp};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STAMP_EXTENSION: &str = "stamp";

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("library directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Stamp(#[from] StampError),
}

#[derive(Debug, Default)]
pub struct StampLibrary {
    directory: Option<PathBuf>,
    stamps: Vec<TerrainStamp>,
}

impl StampLibrary {
    /// An in-memory library with no backing directory. `add` keeps
    /// entries in memory only.
    pub fn in_memory() -> Self {
        StampLibrary::default()
    }

    /// Loads every `.stamp` file under `dir`, sorted by filename.
    ///
    /// Fails only if the directory itself is unreadable; per-file
    /// failures are logged and skipped.
    pub fn load_dir(dir: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let dir = dir.into();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == STAMP_EXTENSION))
            .collect();
        paths.sort();

        let mut stamps = Vec::with_capacity(paths.len());
        for path in paths {
            match TerrainStamp::load(&path) {
                Ok(stamp) => stamps.push(stamp),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable stamp"),
            }
        }

        Ok(StampLibrary {
            directory: Some(dir),
            stamps,
        })
    }

    pub fn stamps(&self) -> &[TerrainStamp] {
        &self.stamps
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TerrainStamp> {
        self.stamps.get(index)
    }

    /// Adds a stamp, persisting it to the backing directory when one
    /// exists. The assigned filename derives from the stamp name.
    pub fn add(&mut self, mut stamp: TerrainStamp) -> Result<(), LibraryError> {
        if let Some(dir) = &self.directory {
            let path = self.unique_path(dir, &stamp.name);
            stamp.save(&path)?;
            stamp.filename = Some(path);
        }
        self.stamps.push(stamp);
        Ok(())
    }

    /// Removes the stamp at `index`, deleting its backing file if any.
    pub fn remove(&mut self, index: usize) -> Option<TerrainStamp> {
        if index >= self.stamps.len() {
            return None;
        }
        let stamp = self.stamps.remove(index);
        if let Some(path) = &stamp.filename {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to delete stamp file");
            }
        }
        Some(stamp)
    }

    fn unique_path(&self, dir: &Path, name: &str) -> PathBuf {
        let base: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let mut path = dir.join(format!("{base}.{STAMP_EXTENSION}"));
        let mut counter = 1;
        while path.exists() {
            path = dir.join(format!("{base}_{counter}.{STAMP_EXTENSION}"));
            counter += 1;
        }
        path
    }
}
