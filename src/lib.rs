//! # slidefill
//!
//! PowerPoint picture-fill transforms for presentation-to-JSON conversion.
//! A picture in a `.pptx` deck rarely shows its embedded bitmap as-is: the
//! `<a:srcRect>` element crops the source, and `<a:stretch><a:fillRect>`
//! insets (or, with negative values, extends) the bitmap relative to the
//! shape frame. This crate bakes both into a new bitmap that is exactly the
//! size of the shape, so downstream renderers can draw it with no further
//! geometry.
//!
//! # Architecture: Three Components
//!
//! ```text
//! 1. OffsetModel     attributes  →  FillRect + SrcRect   (geometry, units)
//! 2. Orchestrator    picture     →  skip / transform / fall back   (process)
//! 3. Engine          bytes + rects  →  container-sized canvas   (imaging)
//! ```
//!
//! - **Validation before pixels**: malformed offsets never reach the engine;
//!   they resolve to "no fill rect" and the picture is left untouched.
//! - **Never abort**: every picture comes back with usable bytes. Engine
//!   failures degrade to the original image plus an error string.
//! - **Exact output size**: the engine always returns
//!   `round(width) × round(height)` pixels, whatever the fractions say.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`units`] | EMU and OOXML percentage conversions, point-space [`units::Bounds`] |
//! | [`geometry`] | `FillRect`, `SrcRect`, `OffsetInfo`, `FillSource` resolution, `ImageGeometry` |
//! | [`imaging`] | Pure layout math plus the [`imaging::PixelEngine`] trait and its `image`-crate engine |
//! | [`process`] | `maybe_transform` and bounded-concurrency `process_batch` |
//! | [`config`] | `slidefill.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting for transforms and batches |
//!
//! # Design Decisions
//!
//! ## Degenerate Regions Are Not Errors
//!
//! Fill rects whose insets overlap, or whose negative offsets push the whole
//! picture off the shape, produce a fully transparent canvas of the right size
//! and an effect entry saying why. PowerPoint renders nothing in those cases,
//! so neither do we.
//!
//! ## One Code Path for Resize and Stretch
//!
//! A zero fill rect is not special-cased inside the engine: it is a stretch
//! whose display area equals the container. The orchestrator skips zero fill
//! rects before the engine is ever called; the engine itself only records
//! `fillRect resize` instead of `fillRect stretch`.
//!
//! ## Injected Engine
//!
//! The orchestrator never asks whether pixel support exists. It is handed a
//! [`imaging::PixelEngine`]; builds without one pass
//! [`imaging::UnavailableEngine`], which turns every call into a skip.

pub mod config;
pub mod geometry;
pub mod imaging;
pub mod output;
pub mod process;
pub mod units;

#[cfg(test)]
pub(crate) mod test_helpers;
