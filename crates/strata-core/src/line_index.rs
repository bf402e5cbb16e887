use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Line, Point, Rect};

/// Extra room around the page so that slightly negative or overflowing
/// coordinates are still inside the indexed extent.
pub const PAGE_MARGIN: f64 = 1000.0;

/// Opaque handle for a line stored in a [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey(Uuid);

impl LineKey {
    fn fresh() -> Self {
        LineKey(Uuid::new_v4())
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A rounded endpoint position and every line that starts or ends there.
#[derive(Debug, Clone)]
struct IndexedPoint {
    position: [i64; 2],
    keys: BTreeSet<LineKey>,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over the endpoints of the lines on one page.
///
/// Finds lines that start or end close to a given line without comparing
/// every pair. Endpoints are rounded to whole units before indexing: the
/// extra precision is never needed and rounding keeps near-identical
/// floating point positions from fragmenting the tree.
///
/// Not synchronized; use one index per page and per worker.
#[derive(Debug)]
pub struct LineIndex {
    tree: RTree<IndexedPoint>,
    lines: HashMap<LineKey, Line>,
    extent: Rect,
}

impl LineIndex {
    /// Create an empty index for a page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        let half_w = (width + PAGE_MARGIN) / 2.0;
        let half_h = (height + PAGE_MARGIN) / 2.0;
        let (cx, cy) = (width / 2.0, height / 2.0);
        LineIndex {
            tree: RTree::new(),
            lines: HashMap::new(),
            extent: Rect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, key: LineKey) -> Option<&Line> {
        self.lines.get(&key)
    }

    /// Insert a line and return the key under which it is stored.
    pub fn add(&mut self, line: Line) -> LineKey {
        let key = LineKey::fresh();
        self.lines.insert(key, line);
        self.insert_point(&line.start, key);
        self.insert_point(&line.end, key);
        key
    }

    /// Remove a line. Unknown keys are ignored.
    pub fn remove(&mut self, key: LineKey) {
        if let Some(line) = self.lines.remove(&key) {
            self.delete_point(&line.start, key);
            self.delete_point(&line.end, key);
        }
    }

    /// All lines with a start or end point inside the bounding box of the
    /// given line, grown by `tolerance` on every side.
    ///
    /// The queried line itself is never part of the result; an unknown key
    /// yields an empty map.
    pub fn neighbouring_lines(&self, key: LineKey, tolerance: f64) -> HashMap<LineKey, Line> {
        let mut neighbours = HashMap::new();
        let Some(line) = self.lines.get(&key) else {
            return neighbours;
        };

        let bbox = line.bounding_rect().expanded(tolerance);
        let lower = [bbox.x0.ceil() as i64, bbox.y0.ceil() as i64];
        let upper = [bbox.x1.floor() as i64, bbox.y1.floor() as i64];
        // No grid point fits inside the box.
        if lower[0] > upper[0] || lower[1] > upper[1] {
            return neighbours;
        }

        let envelope = AABB::from_corners(lower, upper);
        for point in self.tree.locate_in_envelope(&envelope) {
            for neighbour_key in &point.keys {
                if *neighbour_key == key {
                    continue;
                }
                if let Some(neighbour) = self.lines.get(neighbour_key) {
                    neighbours.insert(*neighbour_key, *neighbour);
                }
            }
        }
        neighbours
    }

    fn insert_point(&mut self, point: &Point, key: LineKey) {
        if !self.extent.contains(point) {
            tracing::debug!(x = point.x, y = point.y, "line endpoint outside of page extent");
        }
        let position = point.rounded();
        if let Some(existing) = self.tree.locate_at_point_mut(&position) {
            existing.keys.insert(key);
        } else {
            self.tree.insert(IndexedPoint {
                position,
                keys: BTreeSet::from([key]),
            });
        }
    }

    fn delete_point(&mut self, point: &Point, key: LineKey) {
        let position = point.rounded();
        let now_empty = match self.tree.locate_at_point_mut(&position) {
            Some(existing) => {
                existing.keys.remove(&key);
                existing.keys.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.tree.remove_at_point(&position);
        }
    }
}
