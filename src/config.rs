//! Sampler configuration.
//!
//! [`SamplerConfig`] is the explicit configuration value threaded through the
//! ingress handler and the pipeline — there is no process-wide mutable state.
//! Apart from the scratch directory, the settings are fixed design constants;
//! they are carried as fields so tests and embedders can see (and assert on)
//! the values actually in effect.

use std::fs;
use std::io::Error as IoError;
use std::path::PathBuf;
use std::time::Duration;

/// Time between sampled frames.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// JPEG quality for emitted stills (0–100).
pub const JPEG_QUALITY: u8 = 95;

/// Maximum accepted upload size, matching the transport's own ceiling.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Edit the status message every this many emitted frames.
pub const PROGRESS_EDIT_EVERY: u64 = 5;

/// Configuration for one bot process.
///
/// Create with [`SamplerConfig::new`]; the non-directory fields default to
/// the fixed constants above.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Directory holding in-flight video downloads and per-frame stills.
    pub scratch_dir: PathBuf,
    /// Time between sampled frames.
    pub sample_interval: Duration,
    /// JPEG quality for emitted stills.
    pub jpeg_quality: u8,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
    /// Status-edit cadence, in emitted frames.
    pub progress_edit_every: u64,
}

impl SamplerConfig {
    /// Create a configuration rooted at the given scratch directory.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            sample_interval: SAMPLE_INTERVAL,
            jpeg_quality: JPEG_QUALITY,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            progress_edit_every: PROGRESS_EDIT_EVERY,
        }
    }

    /// Create the scratch directory if it does not exist yet.
    ///
    /// Call once at process start, before handling updates.
    pub fn ensure_scratch_dir(&self) -> Result<(), IoError> {
        fs::create_dir_all(&self.scratch_dir)?;
        log::debug!("Scratch directory ready: {}", self.scratch_dir.display());
        Ok(())
    }
}
