use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Edges, Expanse, Point};

/// Clamp a 64-bit intermediate coordinate back into i32 range.
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A rectangle with a signed origin and unsigned size, in absolute pixels.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}, {})", self.tl.x, self.tl.y, self.w, self.h)
    }
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Does this rect have a zero size?
    pub fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// The size of this rect.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.tl.x) + i64::from(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.tl.y) + i64::from(self.h)
    }

    /// True unless the two rects are separated along some axis. Touching
    /// edges do not count as overlap, but a zero-sized rect strictly inside
    /// the other does.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.right() <= i64::from(other.tl.x)
            || i64::from(self.tl.x) >= other.right()
            || self.bottom() <= i64::from(other.tl.y)
            || i64::from(self.tl.y) >= other.bottom())
    }

    /// The overlapping region of two rects, if it has a positive area.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = self.tl.x.max(other.tl.x);
        let top = self.tl.y.max(other.tl.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= i64::from(left) || bottom <= i64::from(top) {
            return None;
        }
        Some(Self::new(
            left,
            top,
            (right - i64::from(left)) as u32,
            (bottom - i64::from(top)) as u32,
        ))
    }

    /// Half-open point containment: `x <= px < x + w` on both axes.
    pub fn contains_point(&self, p: impl Into<Point>) -> bool {
        let p = p.into();
        i64::from(p.x) >= i64::from(self.tl.x)
            && i64::from(p.x) < self.right()
            && i64::from(p.y) >= i64::from(self.tl.y)
            && i64::from(p.y) < self.bottom()
    }

    /// Does this rect completely enclose `other`?
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.tl.x >= self.tl.x
            && other.tl.y >= self.tl.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The smallest rect enclosing both rects.
    pub fn union(&self, other: &Self) -> Self {
        let left = self.tl.x.min(other.tl.x);
        let top = self.tl.y.min(other.tl.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(
            left,
            top,
            (right - i64::from(left)).clamp(0, i64::from(u32::MAX)) as u32,
            (bottom - i64::from(top)).clamp(0, i64::from(u32::MAX)) as u32,
        )
    }

    /// Bounding box of a set of rects, or `None` if the set is empty.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Self>, r| match acc {
                None => Some(*r),
                Some(b) => Some(b.union(r)),
            })
    }

    /// Return a copy shifted by a signed offset.
    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        Self {
            tl: self.tl.shift(dx, dy),
            w: self.w,
            h: self.h,
        }
    }

    /// Shrink the rect by per-side insets. Negative insets grow it. The size
    /// never drops below zero.
    pub fn inset(&self, edges: Edges<i32>) -> Self {
        let w = i64::from(self.w) - i64::from(edges.left) - i64::from(edges.right);
        let h = i64::from(self.h) - i64::from(edges.top) - i64::from(edges.bottom);
        Self::new(
            clamp_i32(i64::from(self.tl.x) + i64::from(edges.left)),
            clamp_i32(i64::from(self.tl.y) + i64::from(edges.top)),
            w.clamp(0, i64::from(u32::MAX)) as u32,
            h.clamp(0, i64::from(u32::MAX)) as u32,
        )
    }

    /// The same rect with a new size.
    pub fn with_size(&self, w: u32, h: u32) -> Self {
        Self { tl: self.tl, w, h }
    }
}

impl From<Expanse> for Rect {
    fn from(e: Expanse) -> Self {
        e.rect()
    }
}

impl From<(i32, i32, u32, u32)> for Rect {
    fn from(v: (i32, i32, u32, u32)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}
