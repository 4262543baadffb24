//! Geometry primitives used across arbor.

#![warn(missing_docs)]

/// Four-sided box values.
mod edges;
/// Width/height size type.
mod expanse;
/// Signed point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use edges::Edges;
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;

/// Layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis.
    Horizontal,
    /// Vertical axis.
    Vertical,
}

impl Axis {
    /// The other axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
