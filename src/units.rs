//! OOXML unit conversions.
//!
//! DrawingML stores lengths in English Metric Units and picture-fill bounds in
//! thousandths of a percent:
//!
//! | Attribute | Unit | Conversion |
//! |---|---|---|
//! | `<a:off x y>`, `<a:ext cx cy>` | EMU | 12700 EMU = 1 pt |
//! | `<a:srcRect l t r b>`, `<a:fillRect l t r b>` | 1/1000 % | 100000 = 100% |
//!
//! Everything downstream of this module works in points and fractions.

use serde::Serialize;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Picture-fill attribute value that represents 100%.
pub const OOXML_PERCENT_SCALE: f64 = 100_000.0;

/// Convert an EMU length to points.
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT
}

/// Convert a thousandths-of-a-percent attribute (`l="4881"`) to a fraction (`0.04881`).
pub fn ooxml_percent_to_fraction(value: i64) -> f64 {
    value as f64 / OOXML_PERCENT_SCALE
}

/// Axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from `<a:off>` / `<a:ext>` values in EMU.
    pub fn from_emu(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self {
            x: emu_to_points(x),
            y: emu_to_points(y),
            width: emu_to_points(cx),
            height: emu_to_points(cy),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
