//! Scratch-file bookkeeping.
//!
//! Every temporary file this crate creates — the downloaded video and each
//! per-frame still — is owned by a [`ScratchFile`] guard, so removal happens
//! on every exit path rather than only on the happy one. File names embed the
//! requester identity plus a content-unique token, keeping concurrent
//! requests disjoint without locking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::transport::ChatId;

/// Owns a scratch path and removes the file when dropped.
///
/// Creating the guard does not create the file; whoever writes to
/// [`path()`](ScratchFile::path) does. A missing file at drop time is fine.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of a scratch path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The guarded path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Cleaned up: {}", self.path.display()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                log::debug!("Failed to remove {}: {error}", self.path.display());
            }
        }
    }
}

/// Scratch name for an in-flight video download.
pub fn video_scratch_name(chat: ChatId, file_id: &str) -> String {
    format!("{chat}_{file_id}.mp4")
}

/// Scratch name for the `ordinal`-th emitted still of a request.
pub fn frame_scratch_name(chat: ChatId, ordinal: u64) -> String {
    format!("ss_{chat}_{ordinal}.jpg")
}
