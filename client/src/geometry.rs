use measure_shared::{CalibrationRect, PixelDims};

pub const STROKE_WIDTH: f64 = 3.0;
pub const MARKER_RADIUS: f64 = 5.0;
/// Distance from the top edge to the width label's baseline.
pub const WIDTH_LABEL_OFFSET: f64 = 10.0;
/// Distance past the right edge to the height label's centre.
pub const HEIGHT_LABEL_OFFSET: f64 = 20.0;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }

    pub fn width_label_anchor(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y - WIDTH_LABEL_OFFSET)
    }

    pub fn height_label_anchor(&self) -> (f64, f64) {
        (
            self.right() + HEIGHT_LABEL_OFFSET,
            self.y + self.height / 2.0,
        )
    }
}

impl From<CalibrationRect> for Rect {
    fn from(rect: CalibrationRect) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<PixelDims> for Rect {
    fn from(dims: PixelDims) -> Self {
        Rect::new(dims.x, dims.y, dims.w, dims.h)
    }
}

pub fn format_cm(value: f64) -> String {
    format!("{value}cm")
}

/// Canvas backing size for an element displayed at `width` x `height` CSS px.
pub fn canvas_size_for(width: f64, height: f64) -> (u32, u32) {
    let clamp = |value: f64| {
        if value.is_finite() && value > 0.0 {
            value.round() as u32
        } else {
            0
        }
    };
    (clamp(width), clamp(height))
}
