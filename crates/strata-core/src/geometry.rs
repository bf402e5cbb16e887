use serde::{Deserialize, Serialize};

/// A point in page coordinates (origin top-left, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Integer grid position used for spatial indexing. Halves round to the
    /// even neighbour.
    pub fn rounded(&self) -> [i64; 2] {
        [self.x.round_ties_even() as i64, self.y.round_ties_even() as i64]
    }
}

/// An oriented line segment on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Line { start, end }
    }

    /// Axis-aligned bounding box spanned by the two endpoints.
    pub fn bounding_rect(&self) -> Rect {
        Rect {
            x0: self.start.x.min(self.end.x),
            y0: self.start.y.min(self.end.y),
            x1: self.start.x.max(self.end.x),
            y1: self.start.y.max(self.end.y),
        }
    }
}

/// Axis-aligned rectangle, serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Rect { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the rectangle by `margin` on all four sides.
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect {
            x0: self.x0 - margin,
            y0: self.y0 - margin,
            x1: self.x1 + margin,
            y1: self.y1 + margin,
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }
}

impl From<[f64; 4]> for Rect {
    fn from(v: [f64; 4]) -> Self {
        Rect::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [f64; 4] {
    fn from(r: Rect) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_serializes_as_array() {
        let rect = Rect::new(1.0, 2.0, 3.5, 4.0);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, "[1.0,2.0,3.5,4.0]");
        let back: Rect = serde_json::from_str("[1, 2, 3.5, 4]").unwrap();
        assert_eq!(back, rect);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 10.0, 5.0, 12.0);
        let b = Rect::new(2.0, 3.0, 9.0, 11.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 3.0, 9.0, 12.0));
    }

    #[test]
    fn test_line_bounding_rect_ignores_orientation() {
        let line = Line::new(Point::new(10.0, 4.0), Point::new(2.0, 8.0));
        assert_eq!(line.bounding_rect(), Rect::new(2.0, 4.0, 10.0, 8.0));
    }

    #[test]
    fn test_point_rounding() {
        assert_eq!(Point::new(1.49, -0.6).rounded(), [1, -1]);
        assert_eq!(Point::new(2.5, 7.5).rounded(), [2, 8]);
        assert_eq!(Point::new(-0.5, 50.5).rounded(), [0, 50]);
    }
}
