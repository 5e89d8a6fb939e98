//! Image operations delegated to the ImageMagick command-line tools.
//!
//! | Operation | Tool |
//! |---|---|
//! | **Identify** | `identify -format %[fx:w]x%[fx:h]\n` (first frame) |
//! | **Resize** | `convert` with a per-mode operator pipeline |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for parsing and validating dimensions
//! - **Parameters**: Data structures describing a resize
//! - **Command**: Typed invocations and their translation to argument vectors
//! - **Backend**: [`ImageBackend`] trait + [`MagickBackend`]
//! - **Operations**: Public entry points combining the above

pub mod backend;
mod calculations;
pub mod command;
pub mod magick_backend;
pub mod operations;
mod params;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::parse_dimensions;
pub use command::{Invocation, MagickCommand, ToolSet};
pub use magick_backend::MagickBackend;
pub use operations::{get_image_size, plan_resize, resize, resize_named};
pub use params::{FIT_PAD_BOX, Geometry, GeometryFlag, Quality, ResizeMode, ResizeParams};
