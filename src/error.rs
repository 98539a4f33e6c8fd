//! Error types for the `vidsnap` crate.
//!
//! This module defines [`VidsnapError`], the unified error type returned by
//! fallible operations in the crate. Errors carry enough context to produce a
//! user-visible message at the request boundary without extra logging at the
//! call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

use crate::transport::TransportError;

/// The unified error type for `vidsnap` operations.
///
/// Every public method that can fail returns `Result<T, VidsnapError>`,
/// except the transport seam itself, which reports [`TransportError`]
/// directly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidsnapError {
    /// The video file could not be opened for decoding.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The source's frame rate is missing, non-positive, or too low to
    /// derive a sampling stride from.
    #[error("Could not determine a usable frame rate (reported {rate} fps)")]
    UnusableFrameRate {
        /// The frame rate the container reported.
        rate: f64,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// An error from the `image` crate while encoding a still.
    #[error("Image encoding error: {0}")]
    Image(#[from] ImageError),

    /// An I/O error while reading or writing scratch files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A chat-transport call failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<FfmpegError> for VidsnapError {
    fn from(error: FfmpegError) -> Self {
        VidsnapError::VideoDecode(error.to_string())
    }
}
