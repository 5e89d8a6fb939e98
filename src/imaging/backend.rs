//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and resize. The production implementation is
//! [`MagickBackend`](super::magick_backend::MagickBackend), which delegates
//! all pixel work to the ImageMagick command-line tools.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unexpected convert mode: {0}")]
    InvalidMode(String),
    #[error("Invalid target size {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: u32, height: u32 },
    #[error(
        "During cmd execution error occurred.\nCommand: '{command}'\nError code: {}",
        display_code(.code)
    )]
    CommandExecutionFailed { command: String, code: Option<i32> },
    #[error("Unexpected output from '{command}': {output:?} (expected WxH)")]
    MalformedOutput { command: String, output: String },
    #[error("Command '{command}' did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(dims: Dimensions) -> Self {
        (dims.width, dims.height)
    }
}

/// Trait for image backends.
///
/// Operations in [`operations`](super::operations) are generic over this
/// trait so tests can substitute a recording mock for the real tool.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute a resize operation.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
