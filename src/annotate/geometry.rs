//! Page-size independent placement.
//!
//! The planner does not know how large any page is, so every coordinate it
//! emits is an [`Offset`] from one edge (or the center) of the page box.
//! The executor resolves offsets against each output page's MediaBox.

use serde::{Deserialize, Serialize};

/// Distance along one axis, measured in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Offset {
    /// Measured from the left (x) or bottom (y) edge, growing inwards.
    FromStart(f32),
    /// Measured from the midpoint; negative values move left or down.
    FromCenter(f32),
    /// Measured from the right (x) or top (y) edge, growing inwards.
    FromEnd(f32),
}

impl Offset {
    /// Resolve against an axis spanning `start..=end`.
    pub fn resolve(&self, start: f32, end: f32) -> f32 {
        match *self {
            Self::FromStart(d) => start + d,
            Self::FromCenter(d) => (start + end) / 2.0 + d,
            Self::FromEnd(d) => end - d,
        }
    }
}

/// A point on the page expressed as two offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal offset.
    pub x: Offset,
    /// Vertical offset.
    pub y: Offset,
}

impl Anchor {
    /// Create an anchor.
    pub const fn new(x: Offset, y: Offset) -> Self {
        Self { x, y }
    }

    /// Resolve to absolute user-space coordinates on `page`.
    pub fn resolve(&self, page: &PageBox) -> Point {
        Point {
            x: self.x.resolve(page.llx, page.urx),
            y: self.y.resolve(page.lly, page.ury),
        }
    }
}

/// Absolute position in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

/// Axis-aligned rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Bottom-left corner.
    pub origin: Point,
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

/// The visible box of a page (its MediaBox).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x.
    pub llx: f32,
    /// Lower-left y.
    pub lly: f32,
    /// Upper-right x.
    pub urx: f32,
    /// Upper-right y.
    pub ury: f32,
}

impl PageBox {
    /// US Letter, used when a page carries no usable MediaBox.
    pub const LETTER: Self = Self {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    /// Build a box from the four MediaBox numbers, normalising corner order.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            llx: x0.min(x1),
            lly: y0.min(y1),
            urx: x0.max(x1),
            ury: y0.max(y1),
        }
    }

    /// Page width.
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    /// Page height.
    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Color {
    /// Pure black.
    pub const BLACK: Self = Self::gray(0.0);

    /// Dark gray used for label text.
    pub const DARK_GRAY: Self = Self::gray(0.2);

    /// A neutral gray of the given intensity.
    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}
