//! Plain coordinate value types.
//!
//! Two coordinate spaces exist and are never mixed implicitly:
//! - *client* coordinates: relative to a window's content area, (0,0) at its
//!   top-left corner;
//! - *screen* coordinates: relative to the virtual desktop origin (negative
//!   on monitors left of / above the primary one).
//!
//! The types themselves are space-agnostic; every function that accepts or
//! returns one documents which space it uses.

/// A 2D point. Matches the Win32 POINT field layout (two i32s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Chebyshev distance to `other`: max of the absolute per-axis deltas.
    /// This is the step metric for trajectory planning, since a diagonal
    /// move costs the same number of steps as its longer axis.
    pub fn chebyshev(self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// An axis-aligned rectangle. Matches the Win32 RECT field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}
