use serde::{Deserialize, Serialize};

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }

    /// Replaces NaN, infinite and negative components with zero.
    pub fn sanitized(self) -> Self {
        Self {
            width: self.width.non_negative(),
            height: self.height.non_negative(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(self.width / self.height)
    }
}

/// A positioned rectangle, measured from the top-left corner of the window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
}

impl Bounds {
    pub fn size(&self) -> Size { Size::new(self.width, self.height) }
}

pub trait NonNegative {
    fn non_negative(self) -> f64;
}

impl NonNegative for f64 {
    fn non_negative(self) -> f64 { if self.is_finite() && self > 0.0 { self } else { 0.0 } }
}

/// `min(max(value, lo), hi)`; unlike `f64::clamp` this never panics when
/// `lo > hi`, the upper bound wins instead.
pub fn bound(value: f64, lo: f64, hi: f64) -> f64 { value.max(lo).min(hi) }
