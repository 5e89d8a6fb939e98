//! High-level image operations.
//!
//! These functions validate the request, compute parameters, and call the
//! backend. Anything rejected here never reaches a child process.

use super::backend::{BackendError, ImageBackend};
use super::calculations::validate_target;
use super::params::{Quality, ResizeMode, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions as `(width, height)`.
pub fn get_image_size(backend: &impl ImageBackend, source: &Path) -> Result<(u32, u32)> {
    Ok(backend.identify(source)?.into())
}

/// Plan a resize without executing it.
pub fn plan_resize(
    source: &Path,
    destination: &Path,
    width: u32,
    height: u32,
    mode: ResizeMode,
) -> ResizeParams {
    ResizeParams {
        source: source.to_path_buf(),
        output: destination.to_path_buf(),
        width,
        height,
        mode,
        quality: Quality::for_target(width, height),
    }
}

/// Resize `source` into `destination`.
///
/// `destination` is created or replaced. Passing the same path for both
/// overwrites the source in place.
pub fn resize(
    backend: &impl ImageBackend,
    source: &Path,
    destination: &Path,
    width: u32,
    height: u32,
    mode: ResizeMode,
) -> Result<()> {
    validate_target(width, height)?;
    backend.resize(&plan_resize(source, destination, width, height, mode))
}

/// [`resize`] with the mode given by name (`scale`, `fit`, `fit-pad`, `crop`,
/// `scale-crop`). Unknown names fail with [`BackendError::InvalidMode`].
pub fn resize_named(
    backend: &impl ImageBackend,
    source: &Path,
    destination: &Path,
    width: u32,
    height: u32,
    mode: &str,
) -> Result<()> {
    let mode: ResizeMode = mode.parse()?;
    resize(backend, source, destination, width, height, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_image_size_calls_backend() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 500,
            height: 381,
        }]);

        let dims = get_image_size(&backend, Path::new("/resize_test.jpg")).unwrap();
        assert_eq!(dims, (500, 381));
        assert_eq!(
            backend.get_operations(),
            [RecordedOp::Identify("/resize_test.jpg".into())]
        );
    }

    #[test]
    fn get_image_size_propagates_failure() {
        let backend = MockBackend::new();
        let result = get_image_size(&backend, Path::new("/missing.jpg"));
        assert!(matches!(
            result,
            Err(BackendError::CommandExecutionFailed { .. })
        ));
    }

    #[test]
    fn plan_resize_selects_quality() {
        let small = plan_resize(Path::new("a"), Path::new("b"), 299, 300, ResizeMode::Fit);
        assert_eq!(small.quality, Quality::LOW);

        let boundary = plan_resize(Path::new("a"), Path::new("b"), 300, 300, ResizeMode::Fit);
        assert_eq!(boundary.quality, Quality::HIGH);
    }

    #[test]
    fn resize_forwards_every_mode() {
        let backend = MockBackend::new();
        for mode in ResizeMode::ALL {
            resize(
                &backend,
                Path::new("/src.jpg"),
                Path::new("/dst.jpg"),
                220,
                220,
                mode,
            )
            .unwrap();
        }

        let modes: Vec<ResizeMode> = backend
            .get_operations()
            .into_iter()
            .map(|op| match op {
                RecordedOp::Resize { mode, quality, .. } => {
                    assert_eq!(quality, 91);
                    mode
                }
                other => panic!("unexpected op {other:?}"),
            })
            .collect();
        assert_eq!(modes, ResizeMode::ALL);
    }

    #[test]
    fn resize_in_place_keeps_same_path() {
        let backend = MockBackend::new();
        let path = Path::new("/photos/a.jpg");
        resize(&backend, path, path, 600, 600, ResizeMode::Scale).unwrap();

        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Resize { source, output, quality: 99, .. } if source == output
        ));
    }

    #[test]
    fn resize_named_parses_mode() {
        let backend = MockBackend::new();
        resize_named(
            &backend,
            Path::new("/src.jpg"),
            Path::new("/dst.jpg"),
            220,
            220,
            "scale-crop",
        )
        .unwrap();

        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Resize {
                mode: ResizeMode::ScaleCrop,
                ..
            }
        ));
    }

    #[test]
    fn resize_named_unknown_mode_never_reaches_backend() {
        let backend = MockBackend::new();
        let result = resize_named(
            &backend,
            Path::new(""),
            Path::new(""),
            220,
            220,
            "unexpected mode",
        );

        assert!(matches!(result, Err(BackendError::InvalidMode(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn resize_zero_target_never_reaches_backend() {
        let backend = MockBackend::new();
        let result = resize(
            &backend,
            Path::new("/src.jpg"),
            Path::new("/dst.jpg"),
            0,
            220,
            ResizeMode::Crop,
        );

        assert!(matches!(
            result,
            Err(BackendError::InvalidDimensions { .. })
        ));
        assert!(backend.get_operations().is_empty());
    }
}
