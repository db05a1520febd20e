//! Stretch transform engine: pure geometry plus pixel work.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **srcRect crop** | `DynamicImage::crop_imm` |
//! | **Scale** | `resize_exact` (Lanczos3 by default) |
//! | **Compose** | transparent `RgbaImage` + `imageops::replace` |
//! | **Encode** | PNG, or JPEG with quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for canvas, crop and placement math (unit testable)
//! - **Parameters**: Requests, results and the applied-effect log
//! - **Backend**: [`PixelEngine`] trait, [`UnavailableEngine`] and [`RustEngine`]
//! - **Operations**: Contract checks around an engine call

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, PixelEngine, TransformError, UnavailableEngine};
pub use operations::{get_dimensions, plan_transform, transform};
pub use params::{
    AppliedEffect, ImageBytes, ImageKind, OutputFormat, Quality, ResampleFilter, TransformRequest,
    TransformResult,
};
pub use rust_backend::{EngineSettings, RustEngine};
