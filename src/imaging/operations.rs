//! High-level image operations.
//!
//! These functions combine calculations with engine execution. The engine
//! does the pixel work; this layer owns the contract every engine must honour.

use super::backend::{Dimensions, PixelEngine, TransformError};
use super::calculations::canvas_dimensions;
use super::params::{TransformRequest, TransformResult};
use crate::geometry::{ContainerSize, FillRect, SrcRect};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Get image dimensions using the engine.
pub fn get_dimensions(engine: &impl PixelEngine, data: &[u8]) -> Result<(u32, u32)> {
    let dims = engine.identify(data)?;
    Ok((dims.width, dims.height))
}

/// Build a request for one picture.
pub fn plan_transform<'a>(
    source: &'a [u8],
    container: ContainerSize,
    fill_rect: FillRect,
    src_rect: Option<SrcRect>,
    debug: bool,
) -> TransformRequest<'a> {
    TransformRequest {
        source,
        container_width: container.width,
        container_height: container.height,
        fill_rect,
        src_rect,
        debug,
    }
}

/// Run the stretch transform.
///
/// The container is checked before the engine sees the request, and the
/// engine's output is checked against `round(width) × round(height)`. An
/// engine that returns any other size is reported as `ProcessingFailed`.
pub fn transform(
    engine: &impl PixelEngine,
    request: &TransformRequest<'_>,
) -> Result<TransformResult> {
    let expected = canvas_dimensions(request.container_width, request.container_height)?;
    let result = engine.stretch(request)?;

    let actual = Dimensions {
        width: result.width,
        height: result.height,
    };
    if actual != expected {
        return Err(TransformError::ProcessingFailed(format!(
            "engine returned {}x{}, expected {}x{}",
            actual.width, actual.height, expected.width, expected.height
        )));
    }
    Ok(result)
}
