//! Picture-fill geometry: the offset model that feeds the stretch transform.
//!
//! A picture element in a slide carries up to three pieces of placement data:
//!
//! - **`fillRect`**: four signed fractions of the container. Positive values
//!   inset the image from that edge, negative values push it past the edge.
//! - **`srcRect`**: four non-negative fractions cropping the *source* image
//!   before it is fitted.
//! - **`OffsetInfo`**: absolute + percentage offsets, either read from the
//!   stretch markup or derived from the difference between the shape frame
//!   and the picture bounds.
//!
//! The parser hands these over in whatever combination it found. They are
//! folded once into a [`FillSource`] and resolved into a single optional
//! [`FillRect`] when the immutable [`ImageGeometry`] is built. Nothing here
//! touches pixels, and nothing here fails loudly: data that cannot produce a
//! usable fill rect resolves to `None`, which downstream means "leave the image
//! alone".

use crate::units::{Bounds, ooxml_percent_to_fraction};
use serde::{Deserialize, Serialize};

/// Tolerance used for every "is this offset meaningful" comparison.
///
/// Matches the precision of the percentage values the parser produces.
pub const EPSILON: f64 = 0.001;

/// PowerPoint's fill rectangle, as fractions of the container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FillRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl FillRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build from `<a:fillRect l t r b>` attribute values (thousandths of a percent).
    pub fn from_ooxml(l: i64, t: i64, r: i64, b: i64) -> Self {
        Self::new(
            ooxml_percent_to_fraction(l),
            ooxml_percent_to_fraction(t),
            ooxml_percent_to_fraction(r),
            ooxml_percent_to_fraction(b),
        )
    }

    pub fn components(&self) -> [f64; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// True when every side is within [`EPSILON`] of zero.
    pub fn is_zero(&self) -> bool {
        self.components().iter().all(|v| v.abs() <= EPSILON)
    }

    /// Fraction of the container width the image occupies.
    pub fn horizontal_extent(&self) -> f64 {
        1.0 - self.left - self.right
    }

    /// Fraction of the container height the image occupies.
    pub fn vertical_extent(&self) -> f64 {
        1.0 - self.top - self.bottom
    }

    /// True when the display area collapses (or inverts) on either axis.
    pub fn is_degenerate(&self) -> bool {
        !(self.horizontal_extent() > EPSILON && self.vertical_extent() > EPSILON)
    }
}

/// Source-space crop, as fractions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SrcRect {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl SrcRect {
    /// Validated constructor: every side in `[0, 1)`, opposite sides summing below 1.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Option<Self> {
        let sides = [left, top, right, bottom];
        if !sides.iter().all(|v| v.is_finite() && (0.0..1.0).contains(v)) {
            return None;
        }
        if left + right >= 1.0 || top + bottom >= 1.0 {
            return None;
        }
        Some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Build from `<a:srcRect l t r b>` attribute values (thousandths of a percent).
    ///
    /// Negative values (an outward source extension) are treated as no crop on
    /// that side.
    pub fn from_ooxml(l: i64, t: i64, r: i64, b: i64) -> Option<Self> {
        let frac = |v: i64| ooxml_percent_to_fraction(v.max(0));
        Self::new(frac(l), frac(t), frac(r), frac(b))
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// True when at least one side actually removes source pixels.
    pub fn is_crop(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .any(|v| *v > 0.0)
    }
}

/// Where an [`OffsetInfo`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetProvenance {
    /// Read from explicit stretch markup in the slide XML.
    StretchMarkup,
    /// Computed from the shape frame vs. picture bounds.
    PositionDelta,
}

/// A point in slide space (points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Offsets of a picture relative to its container.
///
/// Absolute offsets are in points; percentages are 0–100 of the container's
/// width (left/right) or height (top/bottom). Positive = inset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetInfo {
    pub left_offset: f64,
    pub top_offset: f64,
    pub right_offset: f64,
    pub bottom_offset: f64,
    pub left_offset_percent: f64,
    pub top_offset_percent: f64,
    pub right_offset_percent: f64,
    pub bottom_offset_percent: f64,
    /// Anchor as it appeared in the source markup.
    pub original_anchor: Point,
    /// Anchor after conversion into the output coordinate space.
    pub converted_anchor: Point,
    pub provenance: OffsetProvenance,
}

impl OffsetInfo {
    /// Derive offsets from where the picture sits inside its container.
    ///
    /// A zero-sized container produces non-finite percentages, which
    /// [`to_fill_rect`](Self::to_fill_rect) rejects.
    pub fn derived(container: Bounds, picture: Bounds) -> Self {
        let left = picture.x - container.x;
        let top = picture.y - container.y;
        let right = container.right() - picture.right();
        let bottom = container.bottom() - picture.bottom();

        Self {
            left_offset: left,
            top_offset: top,
            right_offset: right,
            bottom_offset: bottom,
            left_offset_percent: left / container.width * 100.0,
            top_offset_percent: top / container.height * 100.0,
            right_offset_percent: right / container.width * 100.0,
            bottom_offset_percent: bottom / container.height * 100.0,
            original_anchor: Point {
                x: picture.x,
                y: picture.y,
            },
            converted_anchor: Point {
                x: container.x,
                y: container.y,
            },
            provenance: OffsetProvenance::PositionDelta,
        }
    }

    /// Convert percentages to a fill rect, or `None` if they cannot produce one.
    pub fn to_fill_rect(&self) -> Option<FillRect> {
        let rect = FillRect::new(
            self.left_offset_percent / 100.0,
            self.top_offset_percent / 100.0,
            self.right_offset_percent / 100.0,
            self.bottom_offset_percent / 100.0,
        );
        if !rect.components().iter().all(|v| v.is_finite()) {
            return None;
        }
        if rect.is_degenerate() {
            return None;
        }
        Some(rect)
    }
}

/// Whichever fill data the parser found for a picture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillSource {
    /// A `fillRect` taken straight from the markup. Always wins.
    Explicit(FillRect),
    /// Offsets that still need converting and validating.
    Derived(OffsetInfo),
    #[default]
    None,
}

impl FillSource {
    /// Fold the two optional parser outputs, preferring the explicit rect.
    pub fn from_parts(explicit: Option<FillRect>, offset: Option<OffsetInfo>) -> Self {
        match (explicit, offset) {
            (Some(rect), _) => FillSource::Explicit(rect),
            (None, Some(info)) => FillSource::Derived(info),
            (None, None) => FillSource::None,
        }
    }

    pub fn resolve(&self) -> Option<FillRect> {
        match self {
            FillSource::Explicit(rect) => Some(*rect),
            FillSource::Derived(info) => info.to_fill_rect(),
            FillSource::None => None,
        }
    }
}

/// Resolve a fill rect from the explicit rect and/or offset info.
pub fn resolve_fill_rect(
    explicit: Option<FillRect>,
    offset: Option<&OffsetInfo>,
) -> Option<FillRect> {
    FillSource::from_parts(explicit, offset.copied()).resolve()
}

/// Target size of a picture in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Everything the transform pipeline needs to know about one picture element.
///
/// Built once from parsed attributes; the fill rect is resolved at
/// construction and never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageGeometry {
    bounds: Bounds,
    fill_source: FillSource,
    fill_rect: Option<FillRect>,
    src_rect: Option<SrcRect>,
}

impl ImageGeometry {
    pub fn new(bounds: Bounds, fill_source: FillSource, src_rect: Option<SrcRect>) -> Self {
        Self {
            bounds,
            fill_source,
            fill_rect: fill_source.resolve(),
            src_rect,
        }
    }

    pub fn container(&self) -> ContainerSize {
        ContainerSize::new(self.bounds.width, self.bounds.height)
    }

    pub fn fill_rect(&self) -> Option<&FillRect> {
        self.fill_rect.as_ref()
    }

    pub fn src_rect(&self) -> Option<&SrcRect> {
        self.src_rect.as_ref()
    }
}
