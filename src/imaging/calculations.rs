//! Pure geometry for the stretch transform.
//!
//! All functions here are pure and testable without decoding a single pixel.
//! The engine asks three questions, in order:
//!
//! 1. How big is the canvas? ([`canvas_dimensions`])
//! 2. Which part of the source survives `srcRect`? ([`src_crop_region`])
//! 3. How big is the scaled image, and which part of it lands where on the
//!    canvas? ([`plan_layout`])
//! 4. Which source pixels are behind that visible part? ([`source_window`])
//!
//! Rounding is to the nearest pixel everywhere except the `srcRect` crop,
//! which floors so the region never reaches past the source edge.

use super::backend::{Dimensions, TransformError};
use crate::geometry::{FillRect, SrcRect};

/// Largest canvas edge the engine will allocate.
pub const MAX_DIMENSION: u32 = 32_768;

/// Rounded canvas size for a container, or `InvalidContainer`.
pub fn canvas_dimensions(width: f64, height: f64) -> Result<Dimensions, TransformError> {
    let invalid = || TransformError::InvalidContainer { width, height };
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(invalid());
    }
    let (w, h) = (width.round(), height.round());
    if !(1.0..=MAX_DIMENSION as f64).contains(&w) || !(1.0..=MAX_DIMENSION as f64).contains(&h) {
        return Err(invalid());
    }
    Ok(Dimensions {
        width: w as u32,
        height: h as u32,
    })
}

/// A pixel-aligned rectangle inside some image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Source region kept by `srcRect`, or `None` when nothing is cropped.
pub fn src_crop_region(source: Dimensions, rect: &SrcRect) -> Option<PixelRect> {
    if !rect.is_crop() || source.width == 0 || source.height == 0 {
        return None;
    }
    let (sw, sh) = (source.width as f64, source.height as f64);

    let x = ((sw * rect.left()).floor() as u32).min(source.width - 1);
    let y = ((sh * rect.top()).floor() as u32).min(source.height - 1);
    let width = ((sw * (1.0 - rect.left() - rect.right())).floor() as u32).clamp(1, source.width - x);
    let height =
        ((sh * (1.0 - rect.top() - rect.bottom())).floor() as u32).clamp(1, source.height - y);

    Some(PixelRect {
        x,
        y,
        width,
        height,
    })
}

/// Unrounded display area: the container minus the fill-rect insets.
pub fn display_area(container_width: f64, container_height: f64, fill: &FillRect) -> (f64, f64) {
    (
        container_width * fill.horizontal_extent(),
        container_height * fill.vertical_extent(),
    )
}

/// Rounded display-area size.
///
/// Not bounded by [`MAX_DIMENSION`]: a zoomed picture can be many times the
/// canvas. Only the visible part is ever allocated (see [`source_window`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledSize {
    pub width: u64,
    pub height: u64,
}

/// The part of the scaled image that lands on the canvas, in scaled-image
/// coordinates. Its size never exceeds the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRegion {
    pub x: u64,
    pub y: u64,
    pub width: u32,
    pub height: u32,
}

/// Where the scaled image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub scaled: ScaledSize,
    /// Signed canvas position of the scaled image's top-left corner.
    pub offset_x: i64,
    pub offset_y: i64,
    pub visible: VisibleRegion,
    /// Where `visible` is composited.
    pub position_x: u32,
    pub position_y: u32,
}

impl Placement {
    pub fn is_negative_offset(&self) -> bool {
        self.offset_x < 0 || self.offset_y < 0
    }

    /// Pixels trimmed from the right and bottom of the scaled image.
    pub fn trailing_trim(&self) -> (u64, u64) {
        (
            self.scaled.width - self.visible.x - u64::from(self.visible.width),
            self.scaled.height - self.visible.y - u64::from(self.visible.height),
        )
    }

    /// True when the visible image fills the whole canvas.
    pub fn covers(&self, canvas: Dimensions) -> bool {
        self.position_x == 0
            && self.position_y == 0
            && self.visible.width == canvas.width
            && self.visible.height == canvas.height
    }
}

/// Outcome of laying a fill rect out on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    Placed(Placement),
    /// Display area is empty, inverted or non-finite.
    DegenerateDisplay { width: f64, height: f64 },
    /// The scaled image lies entirely outside the canvas.
    ClippedAway { offset_x: i64, offset_y: i64 },
}

struct AxisClip {
    start: u64,
    position: u32,
    length: u32,
}

/// Clip one axis of the scaled image against the canvas.
///
/// A negative offset cuts `-offset` pixels off the leading edge; anything
/// still hanging past the far edge is trimmed.
fn clip_axis(offset: i64, scaled: u64, canvas: u32) -> Option<AxisClip> {
    let scaled = i64::try_from(scaled).unwrap_or(i64::MAX);
    let start = offset.saturating_neg().max(0);
    let position = offset.max(0);
    let length = scaled.saturating_sub(start).min(i64::from(canvas).saturating_sub(position));
    if length <= 0 {
        return None;
    }
    Some(AxisClip {
        start: start as u64,
        position: position as u32,
        length: length as u32,
    })
}

/// Size, position and clip the display area for `fill` on `canvas`.
pub fn plan_layout(
    canvas: Dimensions,
    container_width: f64,
    container_height: f64,
    fill: &FillRect,
) -> Layout {
    let (display_w, display_h) = display_area(container_width, container_height, fill);
    let (scaled_w, scaled_h) = (display_w.round(), display_h.round());
    if !(scaled_w.is_finite() && scaled_h.is_finite() && scaled_w >= 1.0 && scaled_h >= 1.0) {
        return Layout::DegenerateDisplay {
            width: display_w,
            height: display_h,
        };
    }
    let scaled = ScaledSize {
        width: scaled_w as u64,
        height: scaled_h as u64,
    };

    let offset_x = (container_width * fill.left).round() as i64;
    let offset_y = (container_height * fill.top).round() as i64;

    let clipped = clip_axis(offset_x, scaled.width, canvas.width)
        .zip(clip_axis(offset_y, scaled.height, canvas.height));
    let Some((x, y)) = clipped else {
        return Layout::ClippedAway { offset_x, offset_y };
    };

    Layout::Placed(Placement {
        scaled,
        offset_x,
        offset_y,
        visible: VisibleRegion {
            x: x.start,
            y: y.start,
            width: x.length,
            height: y.length,
        },
        position_x: x.position,
        position_y: y.position,
    })
}

/// Source pixels behind the visible part of the scaled image.
///
/// The engine resamples this window straight to the visible size, so the
/// full scaled image is never allocated. Window edges snap outward to whole
/// source pixels; the visible image can be off by less than one source pixel.
pub fn source_window(source: Dimensions, placement: &Placement) -> PixelRect {
    let (x, width) = window_axis(
        source.width,
        placement.scaled.width,
        placement.visible.x,
        placement.visible.width,
    );
    let (y, height) = window_axis(
        source.height,
        placement.scaled.height,
        placement.visible.y,
        placement.visible.height,
    );
    PixelRect {
        x,
        y,
        width,
        height,
    }
}

fn window_axis(source: u32, scaled: u64, start: u64, length: u32) -> (u32, u32) {
    let scale = f64::from(source) / scaled as f64;
    let end = start + u64::from(length);
    let from = ((start as f64 * scale).floor() as u32).min(source.saturating_sub(1));
    let to = ((end as f64 * scale).ceil() as u32)
        .min(source)
        .max(from + 1);
    (from, to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn scaled(width: u64, height: u64) -> ScaledSize {
        ScaledSize { width, height }
    }

    fn placed(layout: Layout) -> Placement {
        match layout {
            Layout::Placed(p) => p,
            other => panic!("expected a placement, got {other:?}"),
        }
    }

    // =========================================================================
    // canvas_dimensions tests
    // =========================================================================

    #[test]
    fn canvas_rounds_to_nearest() {
        assert_eq!(canvas_dimensions(1349.96, 759.29).unwrap(), dims(1350, 759));
        assert_eq!(canvas_dimensions(200.5, 99.4).unwrap(), dims(201, 99));
    }

    #[test]
    fn canvas_rejects_non_positive_and_non_finite() {
        for (w, h) in [
            (0.0, 10.0),
            (10.0, -1.0),
            (f64::NAN, 10.0),
            (10.0, f64::INFINITY),
        ] {
            assert!(matches!(
                canvas_dimensions(w, h),
                Err(TransformError::InvalidContainer { .. })
            ));
        }
    }

    #[test]
    fn canvas_rejects_sub_pixel_and_oversized() {
        assert!(canvas_dimensions(0.3, 10.0).is_err());
        assert!(canvas_dimensions(40_000.0, 10.0).is_err());
    }

    // =========================================================================
    // src_crop_region tests
    // =========================================================================

    #[test]
    fn src_crop_floors_origin_and_size() {
        let rect = SrcRect::new(0.1, 0.1, 0.2, 0.2).unwrap();
        let region = src_crop_region(dims(100, 100), &rect).unwrap();
        assert_eq!(
            region,
            PixelRect {
                x: 10,
                y: 10,
                width: 70,
                height: 70
            }
        );
    }

    #[test]
    fn src_crop_odd_sizes() {
        // 0.333 * 301 = 100.2 → 100; (1 - 0.333 - 0.1) * 301 = 170.67 → 170
        let rect = SrcRect::new(0.333, 0.0, 0.1, 0.0).unwrap();
        let region = src_crop_region(dims(301, 50), &rect).unwrap();
        assert_eq!(region.x, 100);
        assert_eq!(region.width, 170);
        assert_eq!(region.height, 50);
    }

    #[test]
    fn src_crop_stays_inside_tiny_source() {
        let rect = SrcRect::new(0.9, 0.9, 0.05, 0.05).unwrap();
        let region = src_crop_region(dims(3, 3), &rect).unwrap();
        assert!(region.x + region.width <= 3);
        assert!(region.y + region.height <= 3);
        assert!(region.width >= 1 && region.height >= 1);
    }

    #[test]
    fn src_crop_none_without_positive_side() {
        assert_eq!(src_crop_region(dims(100, 100), &SrcRect::default()), None);
    }

    // =========================================================================
    // plan_layout tests
    // =========================================================================

    #[test]
    fn zero_fill_covers_canvas() {
        let canvas = dims(200, 150);
        let p = placed(plan_layout(canvas, 200.0, 150.0, &FillRect::default()));
        assert_eq!(p.scaled, scaled(200, 150));
        assert!(p.covers(canvas));
        assert!(!p.is_negative_offset());
        assert_eq!(p.trailing_trim(), (0, 0));
    }

    #[test]
    fn positive_insets_pad() {
        let canvas = dims(200, 100);
        let fill = FillRect::new(0.1, 0.2, 0.3, 0.0);
        let p = placed(plan_layout(canvas, 200.0, 100.0, &fill));
        assert_eq!(p.scaled, scaled(120, 80));
        assert_eq!((p.position_x, p.position_y), (20, 20));
        assert_eq!((p.visible.width, p.visible.height), (120, 80));
        assert!(!p.covers(canvas));
    }

    #[test]
    fn negative_offsets_crop_leading_edge() {
        // 200x150 container, left=-0.1 top=-0.2 right=0.1 bottom=0.1
        let canvas = dims(200, 150);
        let fill = FillRect::new(-0.1, -0.2, 0.1, 0.1);
        let p = placed(plan_layout(canvas, 200.0, 150.0, &fill));

        assert_eq!(p.scaled, scaled(200, 165));
        assert_eq!((p.offset_x, p.offset_y), (-20, -30));
        assert!(p.is_negative_offset());
        assert_eq!((p.visible.x, p.visible.y), (20, 30));
        assert_eq!((p.visible.width, p.visible.height), (180, 135));
        assert_eq!((p.position_x, p.position_y), (0, 0));
    }

    #[test]
    fn negative_on_both_sides_trims_both_edges() {
        let canvas = dims(100, 100);
        let fill = FillRect::new(-0.1, 0.0, -0.1, 0.0);
        let p = placed(plan_layout(canvas, 100.0, 100.0, &fill));
        assert_eq!(p.scaled.width, 120);
        assert_eq!(p.visible.x, 10);
        assert_eq!(p.visible.width, 100);
        assert_eq!(p.trailing_trim(), (10, 0));
        assert!(p.covers(canvas));
    }

    #[test]
    fn far_edge_overflow_is_trimmed() {
        // Positive left inset, negative right: image runs off the right edge
        let canvas = dims(100, 100);
        let fill = FillRect::new(0.2, 0.0, -0.3, 0.0);
        let p = placed(plan_layout(canvas, 100.0, 100.0, &fill));
        assert_eq!(p.scaled.width, 110);
        assert_eq!(p.position_x, 20);
        assert_eq!(p.visible.width, 80);
        assert_eq!(p.trailing_trim(), (30, 0));
        assert!(!p.is_negative_offset());
    }

    #[test]
    fn concrete_powerpoint_scenario() {
        let canvas = canvas_dimensions(1349.96, 759.29).unwrap();
        let fill = FillRect::new(-0.04881, 0.06029, 0.30709, 0.06029);
        let p = placed(plan_layout(canvas, 1349.96, 759.29, &fill));

        assert_eq!(p.scaled, scaled(1001, 668));
        assert_eq!((p.offset_x, p.offset_y), (-66, 46));
        assert_eq!(p.visible, VisibleRegion {
            x: 66,
            y: 0,
            width: 935,
            height: 668
        });
        assert_eq!((p.position_x, p.position_y), (0, 46));
    }

    #[test]
    fn overlapping_insets_are_degenerate() {
        let fill = FillRect::new(0.6, 0.5, 0.6, 0.5);
        let layout = plan_layout(dims(200, 100), 200.0, 100.0, &fill);
        assert!(matches!(layout, Layout::DegenerateDisplay { width, .. } if width < 0.0));
    }

    #[test]
    fn opposing_extremes_are_degenerate() {
        // left=-2, right=3 leaves zero width
        let fill = FillRect::new(-2.0, 0.0, 3.0, 0.0);
        let layout = plan_layout(dims(100, 100), 100.0, 100.0, &fill);
        assert!(matches!(layout, Layout::DegenerateDisplay { .. }));
    }

    #[test]
    fn far_negative_offset_clips_everything_away() {
        // Display is 50% wide but starts 200% to the left of the canvas
        let fill = FillRect::new(-2.0, 0.0, 2.5, 0.0);
        let layout = plan_layout(dims(100, 100), 100.0, 100.0, &fill);
        assert_eq!(
            layout,
            Layout::ClippedAway {
                offset_x: -200,
                offset_y: 0
            }
        );
    }

    #[test]
    fn inset_past_far_edge_clips_everything_away() {
        let fill = FillRect::new(1.2, 0.0, -0.5, 0.0);
        let layout = plan_layout(dims(100, 100), 100.0, 100.0, &fill);
        assert!(matches!(layout, Layout::ClippedAway { offset_x: 120, .. }));
    }

    #[test]
    fn non_finite_fill_is_degenerate() {
        let fill = FillRect::new(f64::NAN, 0.0, 0.0, 0.0);
        let layout = plan_layout(dims(100, 100), 100.0, 100.0, &fill);
        assert!(matches!(layout, Layout::DegenerateDisplay { .. }));
    }

    #[test]
    fn sub_pixel_display_is_degenerate() {
        let fill = FillRect::new(0.498, 0.0, 0.498, 0.0);
        let layout = plan_layout(dims(100, 100), 100.0, 100.0, &fill);
        assert!(matches!(layout, Layout::DegenerateDisplay { width, .. } if width > 0.0));
    }

    #[test]
    fn zoom_far_past_max_dimension_is_placed() {
        // 2000px canvas, picture 17x wider than the frame
        let fill = FillRect::new(-8.0, 0.0, -8.0, 0.0);
        let p = placed(plan_layout(dims(2000, 100), 2000.0, 100.0, &fill));
        assert_eq!(p.scaled, scaled(34_000, 100));
        assert_eq!(p.offset_x, -16_000);
        assert_eq!(p.visible, VisibleRegion {
            x: 16_000,
            y: 0,
            width: 2000,
            height: 100
        });
        assert!(p.covers(dims(2000, 100)));
        assert_eq!(p.trailing_trim(), (16_000, 0));
    }

    #[test]
    fn absurd_zoom_does_not_overflow() {
        let fill = FillRect::new(-1e12, -1e12, -1e12, -1e12);
        let p = placed(plan_layout(dims(64, 64), 64.0, 64.0, &fill));
        assert!(p.covers(dims(64, 64)));
        let window = source_window(dims(10, 10), &p);
        assert!(window.width <= 2 && window.height <= 2);
        assert!(window.x + window.width <= 10 && window.y + window.height <= 10);
    }

    // =========================================================================
    // source_window tests
    // =========================================================================

    #[test]
    fn fully_visible_image_uses_whole_source() {
        let canvas = dims(200, 100);
        let fill = FillRect::new(0.1, 0.2, 0.3, 0.0);
        let p = placed(plan_layout(canvas, 200.0, 100.0, &fill));
        assert_eq!(
            source_window(dims(37, 19), &p),
            PixelRect {
                x: 0,
                y: 0,
                width: 37,
                height: 19
            }
        );
    }

    #[test]
    fn zoom_window_is_the_centre_of_the_source() {
        let fill = FillRect::new(-8.0, 0.0, -8.0, 0.0);
        let p = placed(plan_layout(dims(2000, 100), 2000.0, 100.0, &fill));
        // 16000..18000 of 34000 scaled pixels = 23.5..26.5 of 50 source pixels
        assert_eq!(
            source_window(dims(50, 50), &p),
            PixelRect {
                x: 23,
                y: 0,
                width: 4,
                height: 50
            }
        );
    }

    #[test]
    fn negative_left_offset_window_is_right_half() {
        let fill = FillRect::new(-1.0, 0.0, 0.0, 0.0);
        let p = placed(plan_layout(dims(40, 20), 40.0, 20.0, &fill));
        let window = source_window(dims(20, 10), &p);
        assert_eq!((window.x, window.width), (10, 10));
        assert_eq!((window.y, window.height), (0, 10));
    }

    #[test]
    fn window_stays_inside_source() {
        let fill = FillRect::new(-0.04881, 0.06029, 0.30709, 0.06029);
        let p = placed(plan_layout(dims(1350, 759), 1349.96, 759.29, &fill));
        let window = source_window(dims(1600, 1067), &p);
        assert_eq!(window.x, 105);
        assert_eq!(window.x + window.width, 1600);
        assert_eq!((window.y, window.height), (0, 1067));
    }
}
