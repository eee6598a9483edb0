/// A point in client (viewport) coordinates, CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle, shaped like `Element.getBoundingClientRect()`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// `true` when the rectangle has no area to map a pointer onto.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Position of `p` relative to the top-left corner.
    pub fn local(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }
}

/// Half-open vertical extent `[top, top + height)` in document coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Span { top, height }
    }

    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_half_open() {
        let s = Span::new(100.0, 50.0);
        assert!(!s.contains(99.9));
        assert!(s.contains(100.0));
        assert!(s.contains(149.9));
        assert!(!s.contains(150.0));
    }

    #[test]
    fn zero_height_span_contains_nothing() {
        assert!(!Span::new(10.0, 0.0).contains(10.0));
    }

    #[test]
    fn degenerate_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, f64::NAN, 10.0).is_degenerate());
        assert!(!Rect::new(5.0, 5.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn local_and_center() {
        let r = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(r.local(Point::new(15.0, 30.0)), Point::new(5.0, 10.0));
        assert_eq!(r.center(), Point::new(60.0, 40.0));
    }
}
