//! Pure functions for dimension handling.
//!
//! Nothing here touches the filesystem or spawns processes.

use super::backend::{BackendError, Dimensions};

/// Parse a `WxH` line as printed by `identify -format %[fx:w]x%[fx:h]\n`.
///
/// The line is split once on the first `x`; both halves must be plain
/// non-negative integers. Surrounding whitespace is ignored.
///
/// # Examples
/// ```
/// # use magick_resize::imaging::parse_dimensions;
/// assert_eq!(parse_dimensions("500x381"), Some((500, 381)));
/// assert_eq!(parse_dimensions("500"), None);
/// ```
pub fn parse_dimensions(line: &str) -> Option<(u32, u32)> {
    let (width, height) = line.trim().split_once('x')?;
    Some((parse_component(width)?, parse_component(height)?))
}

fn parse_component(s: &str) -> Option<u32> {
    // u32::from_str accepts a leading '+', identify never prints one
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Reject zero-sized targets before any process is spawned.
pub fn validate_target(width: u32, height: u32) -> Result<Dimensions, BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::InvalidDimensions { width, height });
    }
    Ok(Dimensions { width, height })
}
