//! Window geometry in logical points.

use serde::{Deserialize, Serialize};

/// Width of the overlay window on first launch and after a reset.
pub const INITIAL_WIDTH: f64 = 550.0;

/// Height of the overlay window on first launch and after a reset.
pub const INITIAL_HEIGHT: f64 = 580.0;

/// Fraction of the centered vertical position kept after a reset, which puts
/// the window in the lower middle of the screen.
const VERTICAL_BIAS: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis aligned rectangle. Whether `y` grows up or down depends on the
/// coordinate space it was taken from, see [`Rect::flip_within`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Default overlay frame inside `area`, in bottom-left origin coordinates.
    ///
    /// Horizontally centered. Vertically, the centered offset from the bottom
    /// of the area is scaled by a quarter.
    pub fn centered_default(area: Rect, size: Size) -> Rect {
        let x = area.x + (area.width - size.width) / 2.0;
        let y = area.y + (area.height - size.height) / 2.0 * VERTICAL_BIAS;
        Rect::new(x, y, size.width, size.height)
    }

    /// Mirrors this rect vertically inside `area`.
    ///
    /// Converts a frame between bottom-left origin (Cocoa) and top-left origin
    /// (tao) coordinates. Applying it twice yields the original rect.
    pub fn flip_within(&self, area: &Rect) -> Rect {
        let y = 2.0 * area.y + area.height - self.y - self.height;
        Rect::new(self.x, y, self.width, self.height)
    }
}
