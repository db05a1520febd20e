//! Pixel engine trait and shared types.
//!
//! The [`PixelEngine`] trait is the capability the orchestrator is handed at
//! construction time. Every engine supports the same two operations: identify
//! and stretch. Callers never ask whether an engine "is available": an engine
//! that cannot do pixel work is simply [`UnavailableEngine`], which answers
//! every call with [`TransformError::Unavailable`].
//!
//! The production implementation is
//! [`RustEngine`](super::rust_backend::RustEngine), built on the `image` crate.

use super::params::{TransformRequest, TransformResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid container {width}x{height}: must be finite and at least one pixel")]
    InvalidContainer { width: f64, height: f64 },
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Pixel engine unavailable")]
    Unavailable,
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for pixel engines.
///
/// Implementations must be `Sync`: batches share one engine across the
/// worker pool.
pub trait PixelEngine: Sync {
    /// Read pixel dimensions without running a transform.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, TransformError>;

    /// Run the stretch transform. The result must be exactly the rounded container size.
    fn stretch(&self, request: &TransformRequest<'_>) -> Result<TransformResult, TransformError>;
}

/// Engine for builds or environments without pixel support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl PixelEngine for UnavailableEngine {
    fn identify(&self, _data: &[u8]) -> Result<Dimensions, TransformError> {
        Err(TransformError::Unavailable)
    }

    fn stretch(&self, _request: &TransformRequest<'_>) -> Result<TransformResult, TransformError> {
        Err(TransformError::Unavailable)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::geometry::{FillRect, SrcRect};
    use crate::imaging::calculations::canvas_dimensions;
    use crate::imaging::params::{AppliedEffect, ImageKind};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Source bytes the mock refuses to decode.
    pub const CORRUPT: &[u8] = b"corrupt";

    /// Mock engine that records stretch calls without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockEngine {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Sleep inside each stretch so concurrent calls overlap.
        pub delay: Option<Duration>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(usize),
        Stretch {
            source: Vec<u8>,
            container_width: f64,
            container_height: f64,
            fill_rect: FillRect,
            src_rect: Option<SrcRect>,
        },
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn stretch_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Stretch { .. }))
                .count()
        }

        /// Highest number of stretch calls that were in flight at once.
        pub fn peak_concurrency(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    impl PixelEngine for MockEngine {
        fn identify(&self, data: &[u8]) -> Result<Dimensions, TransformError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(data.len()));
            Ok(Dimensions {
                width: 100,
                height: 100,
            })
        }

        fn stretch(&self, request: &TransformRequest<'_>) -> Result<TransformResult, TransformError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            self.operations.lock().unwrap().push(RecordedOp::Stretch {
                source: request.source.to_vec(),
                container_width: request.container_width,
                container_height: request.container_height,
                fill_rect: request.fill_rect,
                src_rect: request.src_rect,
            });

            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            if request.source == CORRUPT {
                return Err(TransformError::InvalidImage("mock: corrupt source".into()));
            }
            let canvas = canvas_dimensions(request.container_width, request.container_height)?;
            Ok(TransformResult {
                data: b"transformed".to_vec(),
                width: canvas.width,
                height: canvas.height,
                format: ImageKind::Png,
                applied_effects: vec![AppliedEffect::FillRectStretch(request.fill_rect)],
            })
        }
    }

    fn request(source: &[u8]) -> TransformRequest<'_> {
        TransformRequest {
            source,
            container_width: 200.4,
            container_height: 99.6,
            fill_rect: FillRect::new(0.1, 0.0, 0.0, 0.0),
            src_rect: None,
            debug: false,
        }
    }

    #[test]
    fn mock_records_stretch() {
        let engine = MockEngine::new();
        let result = engine.stretch(&request(b"png")).unwrap();

        assert_eq!((result.width, result.height), (200, 100));
        let ops = engine.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Stretch { source, container_width, .. }
                if source == b"png" && *container_width == 200.4
        ));
    }

    #[test]
    fn mock_rejects_corrupt_source() {
        let engine = MockEngine::new();
        let err = engine.stretch(&request(CORRUPT)).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImage(_)));
        assert_eq!(engine.stretch_count(), 1);
    }

    #[test]
    fn unavailable_engine_refuses_everything() {
        let engine = UnavailableEngine;
        assert!(matches!(
            engine.identify(b"x"),
            Err(TransformError::Unavailable)
        ));
        assert!(matches!(
            engine.stretch(&request(b"x")),
            Err(TransformError::Unavailable)
        ));
    }

    #[test]
    fn error_messages_are_readable() {
        let err = TransformError::InvalidContainer {
            width: 0.0,
            height: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid container 0x10: must be finite and at least one pixel"
        );
        let err = TransformError::InvalidImage("bad header".into());
        assert_eq!(err.to_string(), "Invalid image: bad header");
    }
}
