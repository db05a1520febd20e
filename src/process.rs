//! Transform orchestration: decide, run, fall back.
//!
//! Sits between the picture elements of a converted slide and the
//! [`PixelEngine`]. For every picture it answers three questions:
//!
//! 1. Is there a meaningful fill rect? If not, the original bytes are used
//!    unchanged (`was_processed = false`, no error).
//! 2. Did the engine succeed? If so, the transformed canvas replaces the
//!    original (`was_processed = true`).
//! 3. Did it fail? Then the original bytes are used and the error message is
//!    kept for the caller (`was_processed = false`, `error = Some(..)`).
//!
//! No outcome is ever an `Err`: a document conversion must not abort because
//! one picture could not be stretched.
//!
//! ## Batches
//!
//! [`process_batch`] splits the input into chunks of `concurrency` items and
//! runs each chunk on a dedicated [rayon](https://docs.rs/rayon) pool of the
//! same width. A chunk is fully collected before the next one starts, which
//! caps the number of decoded images alive at once. A panic inside one
//! transform is caught and recorded as that image's fallback. Results come
//! back in input order.
//!
//! ## Progress
//!
//! When given a `Sender<ProcessEvent>`, the batch reports progress after each
//! chunk. Formatting lives in [`output`](crate::output).

use crate::geometry::{ContainerSize, FillRect, ImageGeometry, SrcRect};
use crate::imaging::{
    AppliedEffect, ImageBytes, ImageKind, PixelEngine, TransformError, plan_transform, transform,
};
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Default number of transforms that may run at once.
pub const DEFAULT_CONCURRENCY: usize = 3;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome for one picture. Always carries a usable image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedImage {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub kind: ImageKind,
    pub was_processed: bool,
    pub applied_effects: Vec<AppliedEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessedImage {
    fn original(image: &ImageBytes, error: Option<String>) -> Self {
        Self {
            data: image.data.clone(),
            kind: image.kind,
            was_processed: false,
            applied_effects: Vec::new(),
            error,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    pub fn outcome(&self) -> Outcome {
        match (self.was_processed, &self.error) {
            (true, _) => Outcome::Transformed,
            (false, None) => Outcome::Skipped,
            (false, Some(_)) => Outcome::FellBack,
        }
    }
}

/// How a picture ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Transformed,
    Skipped,
    FellBack,
}

/// Stretch one picture if its fill rect asks for it.
///
/// Skips when `fill_rect` is absent or all four components are within 0.001
/// of zero, even if a `src_rect` is present. An [`TransformError::Unavailable`]
/// engine also counts as a skip. Every other engine error falls back to the
/// original bytes with the message attached.
pub fn maybe_transform(
    engine: &impl PixelEngine,
    image: &ImageBytes,
    fill_rect: Option<&FillRect>,
    src_rect: Option<&SrcRect>,
    container: ContainerSize,
    debug: bool,
) -> ProcessedImage {
    let Some(fill) = fill_rect.filter(|f| !f.is_zero()) else {
        tracing::debug!("no fill rect offset, keeping original image");
        return ProcessedImage::original(image, None);
    };

    let request = plan_transform(&image.data, container, *fill, src_rect.copied(), debug);
    match transform(engine, &request) {
        Ok(result) => {
            tracing::debug!(
                width = result.width,
                height = result.height,
                effects = ?result.effect_strings(),
                "stretch transform applied"
            );
            ProcessedImage {
                data: result.data,
                kind: result.format,
                was_processed: true,
                applied_effects: result.applied_effects,
                error: None,
            }
        }
        Err(TransformError::Unavailable) => {
            tracing::debug!("pixel engine unavailable, keeping original image");
            ProcessedImage::original(image, None)
        }
        Err(err) => {
            tracing::warn!(error = %err, "stretch transform failed, using original image");
            ProcessedImage::original(image, Some(err.to_string()))
        }
    }
}

/// [`maybe_transform`] driven by a picture's resolved geometry.
pub fn process_geometry(
    engine: &impl PixelEngine,
    image: &ImageBytes,
    geometry: &ImageGeometry,
    debug: bool,
) -> ProcessedImage {
    maybe_transform(
        engine,
        image,
        geometry.fill_rect(),
        geometry.src_rect(),
        geometry.container(),
        debug,
    )
}

/// One picture queued for a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: String,
    pub image: ImageBytes,
    pub geometry: ImageGeometry,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub debug: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub id: String,
    #[serde(flatten)]
    pub result: ProcessedImage,
}

/// Batch results in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResults {
    entries: Vec<BatchEntry>,
}

impl BatchResults {
    /// Result for `id`. With duplicate ids, the first one wins.
    pub fn get(&self, id: &str) -> Option<&ProcessedImage> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.result)
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for entry in &self.entries {
            match entry.result.outcome() {
                Outcome::Transformed => summary.transformed += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::FellBack => summary.fell_back += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub transformed: usize,
    pub skipped: usize,
    pub fell_back: usize,
}

/// Progress events emitted during [`process_batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    BatchStarted {
        image_count: usize,
        concurrency: usize,
    },
    ImageTransformed {
        index: usize,
        id: String,
        effects: Vec<String>,
    },
    ImageSkipped {
        index: usize,
        id: String,
    },
    ImageFellBack {
        index: usize,
        id: String,
        error: String,
    },
}

impl ProcessEvent {
    fn for_result(index: usize, id: &str, result: &ProcessedImage) -> Self {
        let id = id.to_string();
        match result.outcome() {
            Outcome::Transformed => ProcessEvent::ImageTransformed {
                index,
                id,
                effects: result
                    .applied_effects
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            },
            Outcome::Skipped => ProcessEvent::ImageSkipped { index, id },
            Outcome::FellBack => ProcessEvent::ImageFellBack {
                index,
                id,
                error: result.error.clone().unwrap_or_default(),
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run one item, turning a panic into a fallback.
fn process_isolated(engine: &impl PixelEngine, item: &BatchItem, debug: bool) -> ProcessedImage {
    catch_unwind(AssertUnwindSafe(|| {
        process_geometry(engine, &item.image, &item.geometry, debug)
    }))
    .unwrap_or_else(|payload| {
        let message = format!("transform panicked: {}", panic_message(payload.as_ref()));
        tracing::warn!(id = %item.id, error = %message, "stretch transform panicked");
        ProcessedImage::original(&item.image, Some(message))
    })
}

/// Transform many pictures with at most `options.concurrency` in flight.
///
/// Every item gets an entry, in input order. Only pool construction can fail.
#[tracing::instrument(skip_all, fields(images = items.len(), concurrency = options.concurrency))]
pub fn process_batch<E: PixelEngine>(
    engine: &E,
    items: &[BatchItem],
    options: BatchOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchResults, ProcessError> {
    let width = options.concurrency.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(width)
        .thread_name(|i| format!("slidefill-worker-{i}"))
        .build()?;

    let send = |event: ProcessEvent| {
        if let Some(tx) = &events {
            // Receiver gone means nobody is listening; keep working.
            let _ = tx.send(event);
        }
    };
    send(ProcessEvent::BatchStarted {
        image_count: items.len(),
        concurrency: width,
    });

    let mut entries = Vec::with_capacity(items.len());
    for chunk in items.chunks(width) {
        let results: Vec<ProcessedImage> = pool.install(|| {
            chunk
                .par_iter()
                .map(|item| process_isolated(engine, item, options.debug))
                .collect()
        });

        for (item, result) in chunk.iter().zip(results) {
            send(ProcessEvent::for_result(entries.len(), &item.id, &result));
            entries.push(BatchEntry {
                id: item.id.clone(),
                result,
            });
        }
    }

    let results = BatchResults { entries };
    let summary = results.summary();
    tracing::debug!(
        transformed = summary.transformed,
        skipped = summary.skipped,
        fell_back = summary.fell_back,
        "batch finished"
    );
    Ok(results)
}
