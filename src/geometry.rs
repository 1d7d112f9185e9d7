//! Bounding rectangles of typeset blocks and point distances.

use crate::types::Block;

/// Axis-aligned rectangle in the downward-y page convention (`top <= bottom`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Lower edge (largest y).
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
    /// Right edge.
    pub right: f64,
    /// Upper edge (smallest y).
    pub top: f64,
}

impl Rectangle {
    /// Rectangle of a single block. Absent height and width count as zero.
    pub fn of(block: &Block) -> Self {
        return Self {
            bottom: block.bottom,
            left: block.left,
            right: block.left + block.width.unwrap_or(0.0),
            top: block.bottom - block.height.unwrap_or(0.0),
        };
    }

    /// Smallest rectangle enclosing every measurable block.
    ///
    /// The fold starts from `+inf` for the minimum-seeking edges and `0` for
    /// the maximum-seeking ones, so an input with nothing measurable comes back
    /// degenerate rather than failing. Check [`Rectangle::is_degenerate`].
    pub fn covering(blocks: &[Block]) -> Self {
        let seed = Self {
            bottom: 0.0,
            left: f64::INFINITY,
            right: 0.0,
            top: f64::INFINITY,
        };
        return blocks
            .iter()
            .filter(|b| return b.is_measurable())
            .map(Self::of)
            .fold(seed, |acc, rect| {
                return Self {
                    bottom: acc.bottom.max(rect.bottom),
                    left: acc.left.min(rect.left),
                    right: acc.right.max(rect.right),
                    top: acc.top.min(rect.top),
                };
            });
    }

    /// Whether a covering fold saw no measurable block.
    pub const fn is_degenerate(&self) -> bool {
        return self.left.is_infinite() || self.top.is_infinite();
    }

    /// Euclidean distance from `(x, y)` to the rectangle's center.
    pub fn distance_from_center(&self, x: f64, y: f64) -> f64 {
        let center_x = (self.left + self.right) / 2.0;
        let center_y = (self.top + self.bottom) / 2.0;
        return (center_x - x).hypot(center_y - y);
    }

    /// Whether `inner` lies entirely within `self`, edges included.
    pub fn contains(&self, inner: &Self) -> bool {
        return self.left <= inner.left
            && self.right >= inner.right
            && self.bottom >= inner.bottom
            && self.top <= inner.top;
    }
}
