//! Parameter types for resize operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! and the [`command`](super::command) translation that turns a request into
//! an ImageMagick argument vector.
//!
//! ## Types
//!
//! - [`ResizeMode`] — The five geometry/fill behaviors a resize can use.
//! - [`Quality`] — Output quality, picked from the requested target size.
//! - [`Geometry`] — A `WxH` geometry with its ImageMagick flag (`!`, `^` or none).
//! - [`ResizeParams`] — Full specification for a resize: source, output, target, mode, quality.

use super::backend::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Box that [`ResizeMode::FitPad`] scales into before extending the canvas.
///
/// This does not follow the requested target size. Callers that depend on
/// the current fit-pad output rely on it staying at 300x300.
pub const FIT_PAD_BOX: (u32, u32) = (300, 300);

/// How the source image is mapped onto the `width x height` target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// Scale to exactly the target size, ignoring aspect ratio.
    Scale,
    /// Scale to fit inside the target, preserving aspect ratio.
    Fit,
    /// Fit into a 300x300 box, then pad to the target with white.
    FitPad,
    /// Place the unscaled image centered on the target canvas; overflow is
    /// trimmed and uncovered area is filled with white.
    Crop,
    /// Scale to cover the target, then trim the overflow around the center.
    ScaleCrop,
}

impl ResizeMode {
    pub const ALL: [ResizeMode; 5] = [
        ResizeMode::Scale,
        ResizeMode::Fit,
        ResizeMode::FitPad,
        ResizeMode::Crop,
        ResizeMode::ScaleCrop,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeMode::Scale => "scale",
            ResizeMode::Fit => "fit",
            ResizeMode::FitPad => "fit-pad",
            ResizeMode::Crop => "crop",
            ResizeMode::ScaleCrop => "scale-crop",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| BackendError::InvalidMode(s.to_string()))
    }
}

/// Output quality passed to `-quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    /// Targets whose `width + height` reach this value get [`Quality::HIGH`].
    pub const THRESHOLD: u64 = 600;
    pub const LOW: Quality = Quality(91);
    pub const HIGH: Quality = Quality(99);

    /// Pick the quality for a `width x height` target.
    ///
    /// Small outputs (thumbnails) tolerate more compression; anything with
    /// `width + height >= 600` is encoded near-lossless.
    pub fn for_target(width: u32, height: u32) -> Self {
        if u64::from(width) + u64::from(height) < Self::THRESHOLD {
            Self::LOW
        } else {
            Self::HIGH
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Suffix flag of an ImageMagick geometry argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFlag {
    /// `WxH` — fit inside, keep aspect ratio.
    Fit,
    /// `WxH!` — exact size, ignore aspect ratio.
    Exact,
    /// `WxH^` — cover the box, keep aspect ratio.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub flag: GeometryFlag,
}

impl Geometry {
    pub fn new(width: u32, height: u32, flag: GeometryFlag) -> Self {
        Self {
            width,
            height,
            flag,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.flag {
            GeometryFlag::Fit => "",
            GeometryFlag::Exact => "!",
            GeometryFlag::Fill => "^",
        };
        write!(f, "{}x{}{}", self.width, self.height, suffix)
    }
}

/// Parameters for a single resize.
///
/// `source` and `output` may be the same path, in which case the source is
/// overwritten in place by the external tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub mode: ResizeMode,
    pub quality: Quality,
}
