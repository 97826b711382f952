//! Error types for the `framepump` crate.
//!
//! This module defines [`EngineError`], the unified error type returned by all
//! fallible engine operations. Variants carry enough context to diagnose a
//! failure without additional logging at the call site.

use std::path::PathBuf;

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `framepump` operations.
///
/// Every public method that can fail returns `Result<T, EngineError>`. Setup
/// errors ([`Open`](EngineError::Open), [`NoVideoStream`](EngineError::NoVideoStream))
/// are fatal to the open that produced them; [`Decode`](EngineError::Decode)
/// leaves the engine valid for drop but its future decode behaviour is
/// unspecified; [`BufferTooSmall`](EngineError::BufferTooSmall) and
/// [`Seek`](EngineError::Seek) leave the engine state unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The media file could not be opened or prepared for decoding.
    #[error("Failed to open media file at {path}: {reason}")]
    Open {
        /// Path that was passed to [`crate::DecodeEngine::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A fatal decoder fault; the stream should be treated as unusable.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// The caller-supplied output buffer cannot hold the decoded frame.
    ///
    /// The frame stays pending inside the engine; a retry with a large enough
    /// buffer yields the same frame.
    #[error("Output buffer too small: frame needs {required} bytes, got {provided}")]
    BufferTooSmall {
        /// `width * height * 3` for the pending frame.
        required: usize,
        /// Length of the buffer the caller supplied.
        provided: usize,
    },

    /// The demuxer rejected the seek request; engine state is unchanged.
    #[error("Seek failed: {0}")]
    Seek(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

impl From<FfmpegError> for EngineError {
    fn from(error: FfmpegError) -> Self {
        EngineError::Ffmpeg(error.to_string())
    }
}
