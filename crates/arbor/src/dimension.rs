//! Declared lengths and their resolution against a parent extent.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use arbor_geom::Edges;
use serde::{Deserialize, Serialize};

/// A declared length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// Absolute pixels.
    Fixed(i32),
    /// Percentage of the parent's resolved extent along the same axis.
    Percent(f32),
    /// Size comes from measurement or content.
    #[default]
    Auto,
}

impl Dimension {
    /// Resolve against a parent extent. `Auto` yields `None`, signalling that
    /// the caller must measure. Percentages floor; a non-finite percentage
    /// resolves to 0.
    pub fn resolve(self, parent: u32) -> Option<i32> {
        match self {
            Self::Fixed(v) => Some(v),
            Self::Percent(p) => {
                let v = (f64::from(p) / 100.0 * f64::from(parent)).floor();
                if v.is_finite() {
                    Some(v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
                } else {
                    Some(0)
                }
            }
            Self::Auto => None,
        }
    }

    /// Resolve, treating `Auto` as 0. Used for offsets, padding and margins.
    pub fn resolve_or_zero(self, parent: u32) -> i32 {
        self.resolve(parent).unwrap_or(0)
    }

    /// Resolve to a size, treating `Auto` as `None` and clamping negative
    /// results to 0.
    pub fn resolve_size(self, parent: u32) -> Option<u32> {
        self.resolve(parent).map(|v| v.max(0) as u32)
    }

    /// Is this the `Auto` dimension?
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Parse a textual length: `"auto"`, `"50%"`, `"10px"` or `"10"`.
    /// Anything unrecognized becomes `Fixed(0)`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Self::Auto;
        }
        if let Some(p) = s.strip_suffix('%') {
            return match p.trim().parse::<f32>() {
                Ok(v) if v.is_finite() => Self::Percent(v),
                _ => Self::Fixed(0),
            };
        }
        let px = s.strip_suffix("px").unwrap_or(s).trim();
        match px.parse::<i32>() {
            Ok(v) => Self::Fixed(v),
            Err(_) => match px.parse::<f64>() {
                Ok(v) if v.is_finite() => Self::Fixed(v.floor() as i32),
                _ => Self::Fixed(0),
            },
        }
    }
}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Fixed(v) => {
                state.write_u8(0);
                state.write_i32(*v);
            }
            Self::Percent(p) => {
                state.write_u8(1);
                state.write_u32(p.to_bits());
            }
            Self::Auto => state.write_u8(2),
        }
    }
}

impl From<i32> for Dimension {
    fn from(v: i32) -> Self {
        Self::Fixed(v)
    }
}

impl From<&str> for Dimension {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "{v}px"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Shorthand for a percentage dimension.
pub fn pct(p: f32) -> Dimension {
    Dimension::Percent(p)
}

/// Shorthand for a fixed pixel dimension.
pub fn px(v: i32) -> Dimension {
    Dimension::Fixed(v)
}

/// Resolve a padding or margin box. Top and bottom resolve against the
/// vertical extent, left and right against the horizontal one. `Auto` sides
/// are zero.
pub fn resolve_edges(edges: &Edges<Dimension>, horizontal: u32, vertical: u32) -> Edges<i32> {
    Edges {
        top: edges.top.resolve_or_zero(vertical),
        right: edges.right.resolve_or_zero(horizontal),
        bottom: edges.bottom.resolve_or_zero(vertical),
        left: edges.left.resolve_or_zero(horizontal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_percent() {
        assert_eq!(Dimension::Percent(50.0).resolve(200), Some(100));
        assert_eq!(Dimension::Percent(33.0).resolve(100), Some(33));
        assert_eq!(Dimension::Percent(33.3).resolve(10), Some(3));
        assert_eq!(Dimension::Percent(-10.0).resolve(15), Some(-2));
    }

    #[test]
    fn resolve_garbage() {
        assert_eq!(Dimension::Percent(f32::NAN).resolve(200), Some(0));
        assert_eq!(Dimension::Percent(f32::INFINITY).resolve(200), Some(0));
        assert_eq!(Dimension::parse("abc%").resolve(200), Some(0));
        assert_eq!(Dimension::parse("wide").resolve(200), Some(0));
    }

    #[test]
    fn resolve_fixed_and_auto() {
        for parent in [0, 1, 999] {
            assert_eq!(Dimension::Fixed(7).resolve(parent), Some(7));
            assert_eq!(Dimension::Auto.resolve(parent), None);
        }
        assert_eq!(Dimension::Fixed(-3).resolve_size(10), Some(0));
        assert_eq!(Dimension::Auto.resolve_or_zero(10), 0);
    }

    #[test]
    fn parse_forms() {
        assert_eq!(Dimension::parse("auto"), Dimension::Auto);
        assert_eq!(Dimension::parse(" AUTO "), Dimension::Auto);
        assert_eq!(Dimension::parse("50%"), Dimension::Percent(50.0));
        assert_eq!(Dimension::parse("10px"), Dimension::Fixed(10));
        assert_eq!(Dimension::parse("12"), Dimension::Fixed(12));
        assert_eq!(Dimension::parse("12.7"), Dimension::Fixed(12));
        assert_eq!(Dimension::parse(""), Dimension::Fixed(0));
    }

    #[test]
    fn edges_resolve_per_axis() {
        let e = Edges::new(pct(10.0), pct(10.0), px(3), Dimension::Auto);
        assert_eq!(resolve_edges(&e, 200, 50), Edges::new(5, 20, 3, 0));
    }
}
