//! Curve flattening: Path → vertex sequence.
//!
//! Every operation past this point (offsets, darts, notches, export) works on
//! the flattened polyline and never looks at Bézier control points.
//!
//! ## Subdivision
//!
//! Curves are halved with de Casteljau (`lyon_geom`'s `split(0.5)`) until the
//! control polygon lies within `tolerance` of the chord. The control polygon
//! bounds the curve, so the flattened curve is never further than `tolerance`
//! from the real one. A depth cap stops runaway subdivision on degenerate
//! control points (e.g. a control point thrown to infinity by a bad draft).
//!
//! The iterator is lazy per segment and `Clone`, so a consumer can restart it
//! or walk it twice without re-flattening the whole path up front.

use std::slice;

use log::warn;
use lyon_geom::{point, CubicBezierSegment};

use crate::geometry::{distance_to_segment, Point, EPSILON};
use crate::path::{Path, Segment};
use crate::polyline::Polyline;

/// Default maximum chord deviation, in cm.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Default cap on the number of halvings per curve.
pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// Flattening settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flattener {
    /// Maximum distance between the curve and its flattened chords.
    pub tolerance: f64,
    /// Maximum subdivision depth per curve segment.
    pub max_depth: u32,
}

impl Default for Flattener {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Flattener {
    /// Set the chord tolerance. Non-positive values fall back to the default.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if tolerance > 0.0 { tolerance } else { DEFAULT_TOLERANCE };
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Lazily walk the flattened vertices of `path`.
    pub fn vertices<'a>(&self, path: &'a Path) -> Vertices<'a> {
        Vertices {
            segments: path.segments().iter(),
            closed: path.is_closed(),
            settings: *self,
            pending: Vec::new(),
            first: None,
            last: None,
        }
    }

    /// Flatten `path` into a [`Polyline`].
    pub fn flatten(&self, path: &Path) -> Polyline {
        Polyline::new(self.vertices(path).collect(), path.is_closed())
    }

    /// Flattened points of one cubic, excluding its start point.
    fn subdivide(&self, curve: CubicBezierSegment<f64>, out: &mut Vec<Point>) {
        // Explicit stack instead of recursion; right halves are pushed first
        // so points come out in curve order.
        let mut stack = vec![(curve, 0u32)];
        let mut capped = false;
        while let Some((seg, depth)) = stack.pop() {
            if is_flat(&seg, self.tolerance) {
                out.push(Point::new(seg.to.x, seg.to.y));
            } else if depth >= self.max_depth {
                capped = true;
                out.push(Point::new(seg.to.x, seg.to.y));
            } else {
                let (left, right) = seg.split(0.5);
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
        if capped {
            warn!(
                "curve subdivision hit depth limit {} before reaching tolerance {}",
                self.max_depth, self.tolerance
            );
        }
    }
}

/// Both control points lie within `tolerance` of the chord.
fn is_flat(seg: &CubicBezierSegment<f64>, tolerance: f64) -> bool {
    let from = Point::new(seg.from.x, seg.from.y);
    let to = Point::new(seg.to.x, seg.to.y);
    let c1 = Point::new(seg.ctrl1.x, seg.ctrl1.y);
    let c2 = Point::new(seg.ctrl2.x, seg.ctrl2.y);
    distance_to_segment(c1, from, to).0 <= tolerance && distance_to_segment(c2, from, to).0 <= tolerance
}

/// Iterator over the flattened vertices of a path.
///
/// Consecutive duplicates are collapsed. On a closed path the final vertex
/// that returns to the start is not emitted.
#[derive(Debug, Clone)]
pub struct Vertices<'a> {
    segments: slice::Iter<'a, Segment>,
    closed: bool,
    settings: Flattener,
    /// Points of the current segment, stored reversed for `pop()`.
    pending: Vec<Point>,
    first: Option<Point>,
    last: Option<Point>,
}

impl Vertices<'_> {
    /// Refill `pending` from the next segment. Returns false when exhausted.
    fn refill(&mut self) -> bool {
        let Some(segment) = self.segments.next() else {
            return false;
        };
        let mut pts = Vec::new();
        match segment {
            Segment::Line { from, to } => {
                pts.push(from.point);
                pts.push(to.point);
            }
            Segment::Curve { from, ctrl1, ctrl2, to } => {
                pts.push(from.point);
                let curve = CubicBezierSegment {
                    from: point(from.point.x, from.point.y),
                    ctrl1: point(ctrl1.x, ctrl1.y),
                    ctrl2: point(ctrl2.x, ctrl2.y),
                    to: point(to.point.x, to.point.y),
                };
                self.settings.subdivide(curve, &mut pts);
            }
        }
        pts.reverse();
        self.pending = pts;
        true
    }
}

impl Iterator for Vertices<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        loop {
            if self.pending.is_empty() && !self.refill() {
                return None;
            }
            let Some(p) = self.pending.pop() else {
                continue;
            };
            if self.last.is_some_and(|last| last.approx_eq(p, EPSILON)) {
                continue;
            }
            let at_end = self.pending.is_empty() && self.segments.len() == 0;
            if self.closed && at_end && self.first.is_some_and(|first| first.approx_eq(p, EPSILON)) {
                return None;
            }
            if self.first.is_none() {
                self.first = Some(p);
            }
            self.last = Some(p);
            return Some(p);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PointRegistry;
    use crate::path::PathBuilder;

    fn square() -> Path {
        Path::polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 50.0),
            ],
            true,
        )
        .unwrap()
    }

    fn curved_path() -> Path {
        let mut reg = PointRegistry::new();
        reg.define("a", 0.0, 0.0);
        reg.define("b", 20.0, 0.0);
        reg.define("c", 20.0, 20.0);
        PathBuilder::new(&reg)
            .curve_with_peak("a", "b", -4.0, 0.3)
            .unwrap()
            .line(&["b", "c", "a"])
            .unwrap()
            .close()
            .unwrap()
    }

    #[test]
    fn line_path_reproduces_vertices() {
        let flat = Flattener::default().flatten(&square());
        assert_eq!(
            flat.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 50.0),
            ]
        );
        assert!(flat.is_closed());
    }

    #[test]
    fn no_consecutive_duplicates() {
        let flat = Flattener::default().flatten(&curved_path());
        for w in flat.points().windows(2) {
            assert!(!w[0].approx_eq(w[1], EPSILON), "duplicate vertex at {:?}", w[0]);
        }
        let first = flat.points()[0];
        let last = flat.points()[flat.len() - 1];
        assert!(!first.approx_eq(last, EPSILON), "closing vertex repeated");
    }

    #[test]
    fn flattening_is_idempotent() {
        let flattener = Flattener::default();
        let once = flattener.flatten(&curved_path());
        let again = flattener.flatten(&once.to_path().unwrap());
        assert_eq!(once.points(), again.points());
    }

    #[test]
    fn iterator_is_restartable() {
        let path = curved_path();
        let iter = Flattener::default().vertices(&path);
        let a: Vec<Point> = iter.clone().collect();
        let b: Vec<Point> = iter.collect();
        assert_eq!(a, b);
    }

    #[test]
    fn flattened_curve_stays_within_tolerance() {
        let flattener = Flattener::default().with_tolerance(0.05);
        let path = curved_path();
        let flat = flattener.flatten(&path);
        let Segment::Curve { from, ctrl1, ctrl2, to } = &path.segments()[0] else {
            panic!("expected a curve first");
        };
        let curve = CubicBezierSegment {
            from: point(from.point.x, from.point.y),
            ctrl1: point(ctrl1.x, ctrl1.y),
            ctrl2: point(ctrl2.x, ctrl2.y),
            to: point(to.point.x, to.point.y),
        };
        for i in 0..=200 {
            let p = curve.sample(i as f64 / 200.0);
            let d = flat.distance_to(Point::new(p.x, p.y));
            assert!(d <= 0.05 + 1e-9, "sample {} is {} from the polyline", i, d);
        }
    }

    #[test]
    fn tighter_tolerance_means_more_vertices() {
        let path = curved_path();
        let coarse = Flattener::default().with_tolerance(1.0).flatten(&path);
        let fine = Flattener::default().with_tolerance(0.01).flatten(&path);
        assert!(fine.len() > coarse.len(), "fine {} vs coarse {}", fine.len(), coarse.len());
    }

    #[test]
    fn depth_cap_bounds_output() {
        let mut reg = PointRegistry::new();
        reg.define("a", 0.0, 0.0);
        reg.define("b", 1.0, 0.0);
        let wild = PathBuilder::new(&reg)
            .curve("a", Point::new(1e9, 1e9), Point::new(-1e9, 1e9), "b")
            .unwrap()
            .finish()
            .unwrap();
        let flat = Flattener::default().with_max_depth(4).flatten(&wild);
        // 2^4 chords at most, plus the start point.
        assert!(flat.len() <= 17);
    }
}
