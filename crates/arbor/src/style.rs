//! Visual and flex properties carried by display nodes.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;

/// An RGBA color.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A solid border.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Border {
    /// Stroke width in pixels.
    pub width: u32,
    /// Stroke color.
    pub color: Color,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// How an image is scaled into its rect.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Scale to fit inside, preserving aspect ratio.
    #[default]
    Contain,
    /// Scale to cover, preserving aspect ratio.
    Cover,
    /// Stretch to the rect.
    Fill,
}

/// Main axis and direction of a flex container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexDirection {
    /// Left to right.
    #[default]
    Row,
    /// Right to left.
    RowReverse,
    /// Top to bottom.
    Column,
    /// Bottom to top.
    ColumnReverse,
}

impl FlexDirection {
    /// Does the main axis run horizontally?
    pub fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Is the main axis reversed?
    pub fn is_reverse(&self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// Main-axis distribution of free space.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustifyContent {
    /// Pack at the start.
    #[default]
    FlexStart,
    /// Center the line.
    Center,
    /// Pack at the end.
    FlexEnd,
    /// First and last items flush, equal space between.
    SpaceBetween,
    /// Equal space around each item.
    SpaceAround,
    /// Equal space between and at both ends.
    SpaceEvenly,
}

/// Cross-axis placement of items.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignItems {
    /// Align to the cross start.
    FlexStart,
    /// Center on the cross axis.
    Center,
    /// Align to the cross end.
    FlexEnd,
    /// Fill the cross axis.
    #[default]
    Stretch,
    /// Baseline alignment. Items carry no baseline, so this places like
    /// `FlexStart`.
    Baseline,
}

/// Line wrapping mode.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexWrap {
    /// Single line.
    #[default]
    NoWrap,
    /// Wrap onto new lines.
    Wrap,
    /// Wrap onto new lines in reverse order.
    WrapReverse,
}

/// Properties of a flex container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlexStyle {
    /// Main axis.
    pub direction: FlexDirection,
    /// Main-axis distribution.
    pub justify: JustifyContent,
    /// Default cross-axis alignment for children.
    pub align: AlignItems,
    /// Wrapping mode. Layout is always single-line; the value is carried for
    /// builders and hashing.
    pub wrap: FlexWrap,
    /// Gap between adjacent items on the main axis.
    pub gap: u32,
}

impl FlexStyle {
    /// A row container.
    pub fn row() -> Self {
        Self::default()
    }

    /// A column container.
    pub fn column() -> Self {
        Self {
            direction: FlexDirection::Column,
            ..Self::default()
        }
    }

    /// Set the main-axis direction.
    pub fn direction(mut self, direction: FlexDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set main-axis distribution.
    pub fn justify(mut self, justify: JustifyContent) -> Self {
        self.justify = justify;
        self
    }

    /// Set cross-axis alignment.
    pub fn align(mut self, align: AlignItems) -> Self {
        self.align = align;
        self
    }

    /// Set the wrapping mode.
    pub fn wrap(mut self, wrap: FlexWrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// Set the inter-item gap.
    pub fn gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}

/// Per-child flex properties, read when the node sits inside a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexItem {
    /// Share of positive free space.
    pub grow: f32,
    /// Share of negative free space.
    pub shrink: f32,
    /// Initial main-axis size.
    pub basis: Dimension,
    /// Override of the container's `align` for this child.
    pub align_self: Option<AlignItems>,
}

impl Default for FlexItem {
    fn default() -> Self {
        Self {
            grow: 0.0,
            shrink: 1.0,
            basis: Dimension::Auto,
            align_self: None,
        }
    }
}

impl Hash for FlexItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.grow.to_bits());
        state.write_u32(self.shrink.to_bits());
        self.basis.hash(state);
        self.align_self.hash(state);
    }
}
