//! Pure Rust pixel engine built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, BMP, TIFF, WebP) | `image::load_from_memory` |
//! | srcRect crop, visible source window | `DynamicImage::crop_imm` |
//! | Scale window to visible size | `DynamicImage::resize_exact` (filter from settings) |
//! | Transparent canvas | `image::RgbaImage::new` (zeroed = fully transparent) |
//! | Composite | `image::imageops::replace` |
//! | Encode | PNG via `write_to`, JPEG via `JpegEncoder::new_with_quality` |
//!
//! The geometry comes from [`calculations`](super::calculations); this module
//! only moves pixels. Only the source window behind the visible region is
//! resampled, so no buffer is ever larger than the canvas or the source.
//! Every intermediate buffer is a local, dropped on every return path.

use super::backend::{Dimensions, PixelEngine, TransformError};
use super::calculations::{
    Layout, Placement, canvas_dimensions, plan_layout, source_window, src_crop_region,
};
use super::params::{
    AppliedEffect, OutputFormat, Quality, ResampleFilter, TransformRequest, TransformResult,
};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// Output encoding and resampling choices for [`RustEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub filter: ResampleFilter,
}

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-step mapping.
#[derive(Debug, Clone, Default)]
pub struct RustEngine {
    settings: EngineSettings,
}

impl RustEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, TransformError> {
    image::load_from_memory(data).map_err(|e| TransformError::InvalidImage(e.to_string()))
}

fn encode(
    canvas: RgbaImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());
    let encoded = match format {
        OutputFormat::Png => DynamicImage::ImageRgba8(canvas).write_to(&mut buf, ImageFormat::Png),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)
        }
    };
    encoded.map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

impl RustEngine {
    /// Scale the visible source window and composite it onto `canvas`.
    fn compose(
        &self,
        source: &DynamicImage,
        placement: &Placement,
        canvas: &mut RgbaImage,
        effects: &mut Vec<AppliedEffect>,
    ) {
        let visible = placement.visible;
        let window = source_window(
            Dimensions {
                width: source.width(),
                height: source.height(),
            },
            placement,
        );
        if placement.is_negative_offset() {
            effects.push(AppliedEffect::NegativeOffsetClip {
                crop_x: visible.x,
                crop_y: visible.y,
            });
        }
        let (trim_right, trim_bottom) = placement.trailing_trim();
        if trim_right > 0 || trim_bottom > 0 {
            effects.push(AppliedEffect::OverflowClip {
                trim_right,
                trim_bottom,
            });
        }

        let clipped = source
            .crop_imm(window.x, window.y, window.width, window.height)
            .resize_exact(
                visible.width,
                visible.height,
                self.settings.filter.filter_type(),
            )
            .to_rgba8();
        image::imageops::replace(
            canvas,
            &clipped,
            i64::from(placement.position_x),
            i64::from(placement.position_y),
        );

        let canvas_dims = Dimensions {
            width: canvas.width(),
            height: canvas.height(),
        };
        if !placement.covers(canvas_dims) {
            effects.push(AppliedEffect::TransparentPadding {
                x: placement.position_x,
                y: placement.position_y,
                width: visible.width,
                height: visible.height,
                canvas_width: canvas_dims.width,
                canvas_height: canvas_dims.height,
            });
        }
    }
}

impl PixelEngine for RustEngine {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, TransformError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::InvalidImage(e.to_string()))?
            .into_dimensions()
            .map_err(|e| TransformError::InvalidImage(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn stretch(&self, request: &TransformRequest<'_>) -> Result<TransformResult, TransformError> {
        let canvas_dims = canvas_dimensions(request.container_width, request.container_height)?;
        let decoded = decode(request.source)?;

        let mut effects = Vec::new();
        if request.debug {
            effects.push(AppliedEffect::Debug(format!(
                "source {}x{}, canvas {}x{}",
                decoded.width(),
                decoded.height(),
                canvas_dims.width,
                canvas_dims.height
            )));
        }

        let source_dims = Dimensions {
            width: decoded.width(),
            height: decoded.height(),
        };
        let crop = request
            .src_rect
            .as_ref()
            .and_then(|rect| src_crop_region(source_dims, rect));
        let source = match crop {
            Some(region) => {
                effects.push(AppliedEffect::SrcRectCrop {
                    x: region.x,
                    y: region.y,
                    width: region.width,
                    height: region.height,
                    source_width: source_dims.width,
                    source_height: source_dims.height,
                });
                decoded.crop_imm(region.x, region.y, region.width, region.height)
            }
            None => decoded,
        };

        let mut canvas = RgbaImage::new(canvas_dims.width, canvas_dims.height);
        let layout = plan_layout(
            canvas_dims,
            request.container_width,
            request.container_height,
            &request.fill_rect,
        );
        match layout {
            Layout::DegenerateDisplay { width, height } => {
                effects.push(AppliedEffect::InvalidDisplayArea { width, height });
            }
            Layout::ClippedAway { offset_x, offset_y } => {
                effects.push(AppliedEffect::EmptyVisibleRegion { offset_x, offset_y });
            }
            Layout::Placed(placement) => {
                if request.debug {
                    effects.push(AppliedEffect::Debug(format!(
                        "display {}x{} at ({}, {})",
                        placement.scaled.width,
                        placement.scaled.height,
                        placement.offset_x,
                        placement.offset_y
                    )));
                }
                self.compose(&source, &placement, &mut canvas, &mut effects);
            }
        }
        drop(source);

        effects.push(if request.fill_rect.is_zero() {
            AppliedEffect::FillRectResize {
                width: canvas_dims.width,
                height: canvas_dims.height,
            }
        } else {
            AppliedEffect::FillRectStretch(request.fill_rect)
        });

        let data = encode(canvas, self.settings.format, self.settings.quality)?;
        Ok(TransformResult {
            data,
            width: canvas_dims.width,
            height: canvas_dims.height,
            format: self.settings.format.kind(),
            applied_effects: effects,
        })
    }
}
