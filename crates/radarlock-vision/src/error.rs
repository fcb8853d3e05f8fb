// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the signal pipeline

/// Result type alias using VisionError
pub type VisionResult<T> = std::result::Result<T, VisionError>;

/// Frame construction and processing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisionError {
    #[error("Unsupported channel count {0} (expected 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}x{channels}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        channels: usize,
        actual: usize,
    },

    #[error("Structuring element must be at least 1x1, got {width}x{height}")]
    InvalidKernel { width: usize, height: usize },
}

/// Failure to grab pixels from a [`crate::FrameSource`]
///
/// Always transient from the pipeline's point of view: the affected part of
/// the cycle reads as zero signal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture backend unavailable: {0}")]
    Unavailable(String),

    #[error("Region {width}x{height} at ({left}, {top}) lies outside the screen")]
    OutOfScreen {
        left: i32,
        top: i32,
        width: u32,
        height: u32,
    },

    #[error("Captured frame has zero area")]
    EmptyFrame,

    #[error("Captured frame is malformed: {0}")]
    Malformed(#[from] VisionError),
}
