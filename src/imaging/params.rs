//! Parameter and result types for the stretch transform.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the orchestration layer (which decides whether a picture
//! needs transforming) and the [`backend`](super::backend) (which does the
//! pixel work).
//!
//! ## Types
//!
//! - [`TransformRequest`]: one picture, one container, one fill rect. Borrowed, short-lived.
//! - [`TransformResult`]: the encoded canvas plus the ordered [`AppliedEffect`] log.
//! - [`ImageBytes`] / [`ImageKind`]: source bytes with their sniffed format.
//! - [`OutputFormat`], [`Quality`], [`ResampleFilter`]: engine settings.

use crate::geometry::{FillRect, SrcRect};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Image container formats the pipeline can read or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
    Unknown,
}

impl ImageKind {
    /// Sniff the format from magic bytes. Never fails; unrecognised data is `Unknown`.
    pub fn detect(data: &[u8]) -> Self {
        match image::guess_format(data) {
            Ok(image::ImageFormat::Png) => ImageKind::Png,
            Ok(image::ImageFormat::Jpeg) => ImageKind::Jpeg,
            Ok(image::ImageFormat::Gif) => ImageKind::Gif,
            Ok(image::ImageFormat::Bmp) => ImageKind::Bmp,
            Ok(image::ImageFormat::Tiff) => ImageKind::Tiff,
            Ok(image::ImageFormat::WebP) => ImageKind::Webp,
            _ => ImageKind::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Webp => "image/webp",
            ImageKind::Unknown => "application/octet-stream",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tif",
            ImageKind::Webp => "webp",
            ImageKind::Unknown => "bin",
        }
    }
}

/// Embedded picture bytes as handed over by the package extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub data: Vec<u8>,
    pub kind: ImageKind,
}

impl ImageBytes {
    pub fn new(data: Vec<u8>) -> Self {
        let kind = ImageKind::detect(&data);
        Self { data, kind }
    }
}

/// Encoding for transformed canvases.
///
/// PNG is the default because padded canvases carry transparency. JPEG
/// flattens transparent areas to black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn kind(self) -> ImageKind {
        match self {
            OutputFormat::Png => ImageKind::Png,
            OutputFormat::Jpeg => ImageKind::Jpeg,
        }
    }
}

/// Resampling filter used when scaling the visible source window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// One stretch transform: fit `source` into a `container_width × container_height` canvas.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub source: &'a [u8],
    pub container_width: f64,
    pub container_height: f64,
    pub fill_rect: FillRect,
    pub src_rect: Option<SrcRect>,
    /// Add `debug:` diagnostics to the effect log.
    pub debug: bool,
}

/// Encoded output of a stretch transform.
///
/// `width`/`height` always equal the rounded container size.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageKind,
    pub applied_effects: Vec<AppliedEffect>,
}

impl TransformResult {
    /// The effect log as display strings.
    pub fn effect_strings(&self) -> Vec<String> {
        self.applied_effects.iter().map(|e| e.to_string()).collect()
    }
}

/// A step the transform actually took, in the order it was taken.
///
/// Rendered with [`Display`](fmt::Display) for logs and the batch report.
/// Informational only; nothing branches on these.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedEffect {
    SrcRectCrop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        source_width: u32,
        source_height: u32,
    },
    InvalidDisplayArea {
        width: f64,
        height: f64,
    },
    EmptyVisibleRegion {
        offset_x: i64,
        offset_y: i64,
    },
    /// Pixels cut off the leading edges of the scaled image.
    NegativeOffsetClip {
        crop_x: u64,
        crop_y: u64,
    },
    OverflowClip {
        trim_right: u64,
        trim_bottom: u64,
    },
    TransparentPadding {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },
    FillRectStretch(FillRect),
    FillRectResize {
        width: u32,
        height: u32,
    },
    Debug(String),
}

impl fmt::Display for AppliedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedEffect::SrcRectCrop {
                x,
                y,
                width,
                height,
                source_width,
                source_height,
            } => write!(
                f,
                "srcRect crop: {width}x{height} at ({x}, {y}) from {source_width}x{source_height}"
            ),
            AppliedEffect::InvalidDisplayArea { width, height } => {
                write!(f, "Invalid display area: {width:.2}x{height:.2}")
            }
            AppliedEffect::EmptyVisibleRegion { offset_x, offset_y } => write!(
                f,
                "Empty visible region: image at ({offset_x}, {offset_y}) lies outside the canvas"
            ),
            AppliedEffect::NegativeOffsetClip { crop_x, crop_y } => {
                write!(f, "negative offset clip: {crop_x}px left, {crop_y}px top")
            }
            AppliedEffect::OverflowClip {
                trim_right,
                trim_bottom,
            } => write!(
                f,
                "overflow clip: {trim_right}px right, {trim_bottom}px bottom"
            ),
            AppliedEffect::TransparentPadding {
                x,
                y,
                width,
                height,
                canvas_width,
                canvas_height,
            } => write!(
                f,
                "transparent padding: {width}x{height} image at ({x}, {y}) on {canvas_width}x{canvas_height} canvas"
            ),
            AppliedEffect::FillRectStretch(rect) => write!(
                f,
                "fillRect stretch: left={}, top={}, right={}, bottom={}",
                rect.left, rect.top, rect.right, rect.bottom
            ),
            AppliedEffect::FillRectResize { width, height } => {
                write!(f, "fillRect resize: {width}x{height}")
            }
            AppliedEffect::Debug(msg) => write!(f, "debug: {msg}"),
        }
    }
}

impl Serialize for AppliedEffect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
