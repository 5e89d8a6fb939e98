//! # magick-resize
//!
//! Resize images and read their pixel dimensions by driving the ImageMagick
//! command-line tools. All decoding, resampling, padding, cropping and
//! encoding happens inside ImageMagick; this crate builds the right
//! invocation for one of five resize modes and reports failures.
//!
//! ```no_run
//! use magick_resize::imaging::{MagickBackend, ResizeMode, get_image_size, resize};
//! use std::path::Path;
//!
//! let backend = MagickBackend::default();
//! resize(&backend, Path::new("photo.jpg"), Path::new("thumb.jpg"), 220, 220, ResizeMode::ScaleCrop)?;
//! assert_eq!(get_image_size(&backend, Path::new("thumb.jpg"))?, (220, 220));
//! # Ok::<(), magick_resize::imaging::BackendError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Resize modes, typed ImageMagick commands, backend trait, entry points |
//! | [`config`] | `magick-resize.toml` loading: executables, flavor, timeout |
//! | [`output`] | CLI output formatting |
//!
//! # Resize Modes
//!
//! | Mode | Result |
//! |------|--------|
//! | `scale` | Exactly `WxH`, aspect ratio ignored |
//! | `fit` | Fits inside `WxH`, aspect ratio kept (one side may be shorter) |
//! | `fit-pad` | Fitted into 300x300, then padded with white to `WxH` |
//! | `crop` | Not resampled; centered on a white `WxH` canvas, overflow trimmed |
//! | `scale-crop` | Scaled to cover `WxH`, overflow trimmed around the center |
//!
//! Output quality is 91 when `width + height < 600` and 99 otherwise.
//! Metadata is always stripped.
//!
//! # No Shell
//!
//! Commands are never assembled as a string. Each [`imaging::MagickCommand`]
//! is translated into an argument vector and spawned directly, so paths with
//! spaces, quotes or shell metacharacters reach ImageMagick unchanged.

pub mod config;
pub mod imaging;
pub mod output;
