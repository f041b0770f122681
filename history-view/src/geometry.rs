//! Integer pixel geometry shared by layout, hit-testing and painting.
//!
//! Every rectangle is half-open: a `Rect` covers `[left, right) x [top, bottom)`.

use std::ops::Add;
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sum of absolute coordinates, the metric used for drag and click distance thresholds.
    pub fn manhattan_length(self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    pub fn is_null(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn left(self) -> i32 {
        self.x
    }

    pub fn top(self) -> i32 {
        self.y
    }

    pub fn right(self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    pub fn intersects(self, other: Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn translated(self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Which outer sides of an album a part touches, used to round the album's
/// outer corners only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectParts(u8);

impl RectParts {
    pub const NONE: RectParts = RectParts(0);
    pub const LEFT: RectParts = RectParts(1);
    pub const TOP: RectParts = RectParts(1 << 1);
    pub const RIGHT: RectParts = RectParts(1 << 2);
    pub const BOTTOM: RectParts = RectParts(1 << 3);
    pub const FULL: RectParts = RectParts(0b1111);

    pub fn contains(self, other: RectParts) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: RectParts) -> RectParts {
        RectParts(self.0 | other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rect_is_half_open() {
        let rect = Rect::new(10, 20, 5, 5);
        assert!(rect.contains(Point::new(10, 20)));
        assert!(rect.contains(Point::new(14, 24)));
        assert!(!rect.contains(Point::new(15, 24)));
        assert!(!rect.contains(Point::new(14, 25)));
    }

    #[test]
    fn adjacent_rects_do_not_intersect() {
        let upper = Rect::new(0, 0, 10, 10);
        let lower = Rect::new(0, 10, 10, 10);
        assert!(!upper.intersects(lower));
        assert!(upper.intersects(lower.translated(0, -1)));
    }

    #[test]
    fn rect_parts_union() {
        let corner = RectParts::LEFT.union(RectParts::TOP);
        assert!(corner.contains(RectParts::TOP));
        assert!(!corner.contains(RectParts::RIGHT));
        assert_eq!(
            corner.union(RectParts::RIGHT).union(RectParts::BOTTOM),
            RectParts::FULL
        );
    }

    #[test]
    fn manhattan_length_sums_axes() {
        assert_eq!((Point::new(3, 4) - Point::new(6, 0)).manhattan_length(), 7);
    }
}
