use serde::{Deserialize, Serialize};

/// Values for the four sides of a box, in CSS order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edges<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Copy> Edges<T> {
    /// Construct edges from explicit values.
    pub fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same value on every side.
    pub fn all(v: T) -> Self {
        Self::new(v, v, v, v)
    }

    /// Vertical and horizontal values, CSS two-value shorthand.
    pub fn symmetric(vertical: T, horizontal: T) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Map every side through a function.
    pub fn map<U>(&self, mut f: impl FnMut(T) -> U) -> Edges<U> {
        Edges {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}

impl Edges<i32> {
    /// Sum of the left and right edges.
    pub fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    /// Sum of the top and bottom edges.
    pub fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

impl<T: Copy> From<(T, T, T, T)> for Edges<T> {
    fn from(v: (T, T, T, T)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand() {
        let e = Edges::symmetric(1, 2);
        assert_eq!(e, Edges::new(1, 2, 1, 2));
        assert_eq!(e.horizontal(), 4);
        assert_eq!(e.vertical(), 2);
        assert_eq!(Edges::all(3).map(|v| v * 2), Edges::all(6));
    }
}
