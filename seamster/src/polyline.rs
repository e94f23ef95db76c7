//! Flattened outlines.
//!
//! A [`Polyline`] is what every geometric operation past the flattener works
//! on: offsets, darts, notches, clipping and export. Closed polylines do not
//! repeat their first vertex at the end; the closing edge is implicit.

use crate::clip::point_in_polygon;
use crate::error::{Error, Result};
use crate::geometry::{distance_to_segment, signed_area_of_points, BoundingBox, Point, EPSILON};
use crate::path::Path;

/// A vertex sequence, open or closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    closed: bool,
}

/// A position on a polyline: which edge, how far along it, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Edge index; edge `i` runs from vertex `i` to vertex `i + 1` (wrapping
    /// for closed polylines).
    pub edge: usize,
    /// Parameter along the edge in `[0, 1]`.
    pub t: f64,
    pub point: Point,
    /// Arc-length fraction of the whole polyline.
    pub fraction: f64,
}

impl Polyline {
    /// Build from raw vertices, collapsing consecutive duplicates (and a
    /// repeated closing vertex when `closed`).
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        let mut pts: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if pts.last().is_none_or(|last: &Point| !last.approx_eq(p, EPSILON)) {
                pts.push(p);
            }
        }
        if closed && pts.len() > 1 && pts[0].approx_eq(pts[pts.len() - 1], EPSILON) {
            pts.pop();
        }
        Self { points: pts, closed }
    }

    /// The read-only vertex sequence, for previewers and exporters.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Endpoints of edge `i`.
    pub fn edge(&self, i: usize) -> (Point, Point) {
        let n = self.points.len();
        (self.points[i], self.points[(i + 1) % n])
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        (0..self.edge_count()).map(move |i| self.edge(i))
    }

    /// Total length, closing edge included.
    pub fn length(&self) -> f64 {
        self.edges().map(|(a, b)| a.distance(b)).sum()
    }

    /// Running arc length at each vertex; one more entry than there are
    /// edges, starting at 0.
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        let mut acc = Vec::with_capacity(self.edge_count() + 1);
        let mut total = 0.0;
        acc.push(0.0);
        for (a, b) in self.edges() {
            total += a.distance(b);
            acc.push(total);
        }
        acc
    }

    /// Find the point at arc-length `fraction` of the way along.
    pub fn locate(&self, fraction: f64) -> Result<Location> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidPosition(fraction));
        }
        if self.edge_count() == 0 {
            return Err(Error::DegeneratePath { found: self.points.len(), required: 2 });
        }
        let cum = self.cumulative_lengths();
        let total = cum[cum.len() - 1];
        let target = fraction * total;
        // First edge whose end reaches the target.
        let edge = cum[1..]
            .iter()
            .position(|&c| c >= target - EPSILON)
            .unwrap_or(self.edge_count() - 1);
        let (a, b) = self.edge(edge);
        let len = cum[edge + 1] - cum[edge];
        let t = if len > EPSILON { ((target - cum[edge]) / len).clamp(0.0, 1.0) } else { 0.0 };
        Ok(Location { edge, t, point: a.lerp(b, t), fraction })
    }

    /// The closest point on the polyline to `p`.
    pub fn project(&self, p: Point) -> Result<Location> {
        if self.edge_count() == 0 {
            return Err(Error::DegeneratePath { found: self.points.len(), required: 2 });
        }
        let cum = self.cumulative_lengths();
        let total = cum[cum.len() - 1];
        let mut best: Option<(f64, usize, f64)> = None;
        for (i, (a, b)) in self.edges().enumerate() {
            let (d, t) = distance_to_segment(p, a, b);
            if best.is_none_or(|(bd, _, _)| d < bd - EPSILON) {
                best = Some((d, i, t));
            }
        }
        let (_, edge, t) = best.ok_or(Error::DegeneratePath { found: self.points.len(), required: 2 })?;
        let (a, b) = self.edge(edge);
        let along = cum[edge] + (cum[edge + 1] - cum[edge]) * t;
        let fraction = if total > EPSILON { (along / total).clamp(0.0, 1.0) } else { 0.0 };
        Ok(Location { edge, t, point: a.lerp(b, t), fraction })
    }

    /// Shortest distance from `p` to any edge.
    pub fn distance_to(&self, p: Point) -> f64 {
        self.edges()
            .map(|(a, b)| distance_to_segment(p, a, b).0)
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `p` lies inside a closed outline. Always false for open ones.
    pub fn contains(&self, p: Point) -> bool {
        self.closed && point_in_polygon(p, &self.points)
    }

    /// Shoelace area; sign gives the winding.
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.points)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Mirror across the vertical line `x = mirror_x`.
    pub fn mirrored(&self, mirror_x: f64) -> Polyline {
        Polyline {
            points: self.points.iter().map(|p| Point::new(2.0 * mirror_x - p.x, p.y)).collect(),
            closed: self.closed,
        }
    }

    /// Back to a line-only [`Path`].
    pub fn to_path(&self) -> Result<Path> {
        Path::polyline(&self.points, self.closed)
    }
}
