//! Paths: ordered chains of line and cubic curve segments.
//!
//! A [`Path`] is built once, validated once and then never mutated. Every
//! later stage (flattening, offsetting, darts) produces a new value.
//!
//! ```text
//!   registry ──► PathBuilder ──line/curve/..──► close() / finish() ──► Path
//!                    (resolves ids eagerly,           (validates)
//!                     checks continuity)
//! ```

use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, EPSILON};
use crate::registry::PointRegistry;

/// A segment endpoint: the resolved coordinate plus the registry id it came
/// from, if any. Derived geometry (offsets, imports, darts) has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: Option<String>,
    pub point: Point,
}

impl Anchor {
    pub fn named(id: impl Into<String>, point: Point) -> Self {
        Self { id: Some(id.into()), point }
    }

    pub fn at(point: Point) -> Self {
        Self { id: None, point }
    }

    /// Anchors match when their ids agree (if both have one) and their
    /// coordinates coincide.
    fn joins(&self, other: &Anchor) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) if a != b => false,
            _ => self.point.approx_eq(other.point, 1e-6),
        }
    }

    fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("({:.3}, {:.3})", self.point.x, self.point.y),
        }
    }
}

/// One piece of a path.
///
/// ## Rust Lesson #12: Enums carry data
///
/// A Rust enum variant can hold fields. The flattener just `match`es on the
/// kind and never needs a class hierarchy or a `kind` string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line { from: Anchor, to: Anchor },
    Curve { from: Anchor, ctrl1: Point, ctrl2: Point, to: Anchor },
}

impl Segment {
    pub fn start(&self) -> &Anchor {
        match self {
            Segment::Line { from, .. } | Segment::Curve { from, .. } => from,
        }
    }

    pub fn end(&self) -> &Anchor {
        match self {
            Segment::Line { to, .. } | Segment::Curve { to, .. } => to,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, Segment::Curve { .. })
    }

    fn mirrored(&self, mirror_x: f64) -> Segment {
        let flip = |p: Point| Point::new(2.0 * mirror_x - p.x, p.y);
        let flip_anchor = |a: &Anchor| Anchor { id: a.id.clone(), point: flip(a.point) };
        match self {
            Segment::Line { from, to } => Segment::Line { from: flip_anchor(from), to: flip_anchor(to) },
            Segment::Curve { from, ctrl1, ctrl2, to } => Segment::Curve {
                from: flip_anchor(from),
                ctrl1: flip(*ctrl1),
                ctrl2: flip(*ctrl2),
                to: flip_anchor(to),
            },
        }
    }
}

/// An immutable chain of segments, open or closed.
///
/// A closed path's last segment ends where the first one starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    closed: bool,
}

impl Path {
    /// Straight segments through `points`. A closed polyline gets a closing
    /// segment back to the first point unless the last point already repeats it.
    pub fn polyline(points: &[Point], closed: bool) -> Result<Path> {
        let mut pts: Vec<Point> = Vec::with_capacity(points.len() + 1);
        for &p in points {
            if pts.last().is_none_or(|last: &Point| !last.approx_eq(p, EPSILON)) {
                pts.push(p);
            }
        }
        if closed && pts.len() > 1 && pts[0].approx_eq(pts[pts.len() - 1], EPSILON) {
            pts.pop();
        }
        let required = if closed { 3 } else { 2 };
        if pts.len() < required {
            return Err(Error::DegeneratePath { found: pts.len(), required });
        }
        if closed {
            pts.push(pts[0]);
        }
        let segments = pts
            .windows(2)
            .map(|w| Segment::Line { from: Anchor::at(w[0]), to: Anchor::at(w[1]) })
            .collect();
        Ok(Path { segments, closed })
    }

    /// Assemble a path from ready-made segments, checking continuity (and
    /// closure when `closed` is set).
    pub fn from_segments(segments: Vec<Segment>, closed: bool) -> Result<Path> {
        if segments.is_empty() {
            return Err(Error::DegeneratePath { found: 0, required: 2 });
        }
        for pair in segments.windows(2) {
            if !pair[0].end().joins(pair[1].start()) {
                return Err(Error::DiscontinuousPath {
                    expected: pair[0].end().label(),
                    found: pair[1].start().label(),
                });
            }
        }
        if closed {
            let first = segments[0].start();
            let last = segments[segments.len() - 1].end();
            if !last.joins(first) {
                return Err(Error::DiscontinuousPath { expected: first.label(), found: last.label() });
            }
        }
        Ok(Path { segments, closed })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn start(&self) -> Point {
        self.segments[0].start().point
    }

    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].end().point
    }

    pub fn has_curves(&self) -> bool {
        self.segments.iter().any(Segment::is_curve)
    }

    /// Mirror across the vertical line `x = mirror_x`. Segment order is kept,
    /// so the winding of a closed path flips.
    pub fn mirrored(&self, mirror_x: f64) -> Path {
        Path {
            segments: self.segments.iter().map(|s| s.mirrored(mirror_x)).collect(),
            closed: self.closed,
        }
    }
}

/// Accumulates segments from named points, then validates on `close()` or
/// `finish()`.
///
/// Every method takes and returns the builder, so a whole outline reads as
/// one chain:
///
/// ```
/// # use seamster::{PointRegistry, PathBuilder};
/// let mut reg = PointRegistry::new();
/// reg.define("0", 0.0, 0.0);
/// reg.define("1", 10.0, 0.0);
/// reg.define("2", 10.0, 10.0);
/// let path = PathBuilder::new(&reg)
///     .line(&["0", "1", "2", "0"])?
///     .close()?;
/// assert!(path.is_closed());
/// # Ok::<(), seamster::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PathBuilder<'r> {
    registry: &'r PointRegistry,
    segments: Vec<Segment>,
}

impl<'r> PathBuilder<'r> {
    pub fn new(registry: &'r PointRegistry) -> Self {
        Self { registry, segments: Vec::new() }
    }

    fn anchor(&self, id: &str) -> Result<Anchor> {
        Ok(Anchor::named(id, self.registry.resolve(id)?))
    }

    /// The new segment must start where the previous one ended.
    fn check_continuity(&self, start: &str) -> Result<()> {
        if let Some(last) = self.segments.last() {
            let end = last.end();
            if end.id.as_deref() != Some(start) {
                return Err(Error::DiscontinuousPath { expected: end.label(), found: start.to_string() });
            }
        }
        Ok(())
    }

    /// Straight segments through the given point ids, in order.
    pub fn line(mut self, ids: &[&str]) -> Result<Self> {
        if ids.len() < 2 {
            return Err(Error::DegeneratePath { found: ids.len(), required: 2 });
        }
        self.check_continuity(ids[0])?;
        let mut from = self.anchor(ids[0])?;
        for id in &ids[1..] {
            let to = self.anchor(id)?;
            self.segments.push(Segment::Line { from, to: to.clone() });
            from = to;
        }
        Ok(self)
    }

    /// One cubic Bezier from `start` to `end` with explicit control points.
    pub fn curve(mut self, start: &str, ctrl1: Point, ctrl2: Point, end: &str) -> Result<Self> {
        self.check_continuity(start)?;
        let from = self.anchor(start)?;
        let to = self.anchor(end)?;
        self.segments.push(Segment::Curve { from, ctrl1, ctrl2, to });
        Ok(self)
    }

    /// A curve that bulges `peak` cm off the chord, to the left of the
    /// `start → end` direction (negative peaks bulge right).
    ///
    /// `inflection` in `[0, 1]` slides the bulge along the chord; 0.5 keeps
    /// it centred.
    pub fn curve_with_peak(self, start: &str, end: &str, peak: f64, inflection: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&inflection) {
            return Err(Error::InvalidPosition(inflection));
        }
        let s = self.registry.resolve(start)?;
        let e = self.registry.resolve(end)?;
        let chord = e - s;
        let unit_perp = chord.perp().normalized().unwrap_or_default();
        let mid = s.lerp(e, 0.5);
        let control = mid + unit_perp * (peak * 2.0) + chord * (inflection - 0.5);
        let (c1, c2) = elevate(s, control, e);
        self.curve(start, c1, c2, end)
    }

    /// A curve whose midpoint lies `distance` cm from `reference`, on the
    /// line from the chord midpoint to the reference.
    ///
    /// Used for crotch and armhole curves that must pass a set distance from
    /// a construction corner.
    pub fn curve_toward(self, start: &str, end: &str, reference: &str, distance: f64) -> Result<Self> {
        let s = self.registry.resolve(start)?;
        let e = self.registry.resolve(end)?;
        let r = self.registry.resolve(reference)?;
        let mid = s.lerp(e, 0.5);
        let reach = mid.distance(r);
        if reach < EPSILON {
            return Err(Error::DegeneratePath { found: 1, required: 2 });
        }
        let curve_mid = mid + (r - mid) * (1.0 - distance / reach);
        // A quadratic passes through 0.25*s + 0.5*q + 0.25*e at t = 0.5.
        let control = curve_mid * 2.0 - s * 0.5 - e * 0.5;
        let (c1, c2) = elevate(s, control, e);
        self.curve(start, c1, c2, end)
    }

    /// Finish as a closed outline. The last segment must end on the first
    /// segment's start point.
    pub fn close(self) -> Result<Path> {
        let first = self.segments.first().ok_or(Error::DegeneratePath { found: 0, required: 3 })?;
        let last = &self.segments[self.segments.len() - 1];
        if first.start().id != last.end().id {
            return Err(Error::DiscontinuousPath { expected: first.start().label(), found: last.end().label() });
        }
        debug!("closed path with {} segments", self.segments.len());
        Ok(Path { segments: self.segments, closed: true })
    }

    /// Finish as an open path.
    pub fn finish(self) -> Result<Path> {
        if self.segments.is_empty() {
            return Err(Error::DegeneratePath { found: 0, required: 2 });
        }
        Ok(Path { segments: self.segments, closed: false })
    }
}

/// Degree-elevate the quadratic `p0, q, p3` to cubic control points.
pub(crate) fn elevate(p0: Point, q: Point, p3: Point) -> (Point, Point) {
    let c1 = p0 + (q - p0) * (2.0 / 3.0);
    let c2 = p3 + (q - p3) * (2.0 / 3.0);
    (c1, c2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_registry() -> PointRegistry {
        let mut reg = PointRegistry::new();
        reg.define("a", 0.0, 0.0);
        reg.define("b", 50.0, 0.0);
        reg.define("c", 50.0, 50.0);
        reg.define("d", 0.0, 50.0);
        reg
    }

    fn cubic_at(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
        let u = 1.0 - t;
        p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    #[test]
    fn closed_square() {
        let reg = square_registry();
        let path = PathBuilder::new(&reg).line(&["a", "b", "c", "d", "a"]).unwrap().close().unwrap();
        assert!(path.is_closed());
        assert_eq!(path.segments().len(), 4);
        assert_eq!(path.start(), Point::new(0.0, 0.0));
    }

    #[test]
    fn missing_point_fails_at_build_time() {
        let reg = square_registry();
        let err = PathBuilder::new(&reg).line(&["a", "zz"]).unwrap_err();
        assert_eq!(err, Error::MissingPoint("zz".into()));
    }

    #[test]
    fn discontinuity_is_rejected() {
        let reg = square_registry();
        let err = PathBuilder::new(&reg)
            .line(&["a", "b"])
            .unwrap()
            .line(&["c", "d"])
            .unwrap_err();
        assert_eq!(err, Error::DiscontinuousPath { expected: "b".into(), found: "c".into() });
    }

    #[test]
    fn close_requires_returning_to_start() {
        let reg = square_registry();
        let err = PathBuilder::new(&reg).line(&["a", "b", "c"]).unwrap().close().unwrap_err();
        assert!(matches!(err, Error::DiscontinuousPath { .. }));

        let err = PathBuilder::new(&reg).close().unwrap_err();
        assert!(matches!(err, Error::DegeneratePath { .. }));
    }

    #[test]
    fn redefinition_does_not_touch_built_segments() {
        let mut reg = square_registry();
        let path = PathBuilder::new(&reg).line(&["a", "b"]).unwrap().finish().unwrap();
        reg.define("b", 99.0, 99.0);
        assert_eq!(path.end(), Point::new(50.0, 0.0));
    }

    #[test]
    fn peak_curve_touches_the_peak() {
        let mut reg = PointRegistry::new();
        reg.define("s", 0.0, 0.0);
        reg.define("e", 10.0, 0.0);
        let path = PathBuilder::new(&reg).curve_with_peak("s", "e", 2.0, 0.5).unwrap().finish().unwrap();
        let Segment::Curve { from, ctrl1, ctrl2, to } = &path.segments()[0] else {
            panic!("expected a curve");
        };
        let mid = cubic_at(from.point, *ctrl1, *ctrl2, to.point, 0.5);
        // Left of +x is +y with the (-dy, dx) perpendicular.
        assert_relative_eq!(mid.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn peak_curve_rejects_bad_inflection() {
        let reg = square_registry();
        let err = PathBuilder::new(&reg).curve_with_peak("a", "b", 1.0, 1.5).unwrap_err();
        assert_eq!(err, Error::InvalidPosition(1.5));
    }

    #[test]
    fn reference_curve_keeps_its_distance() {
        let mut reg = PointRegistry::new();
        reg.define("s", 0.0, 0.0);
        reg.define("e", 10.0, 10.0);
        reg.define("corner", 0.0, 10.0);
        let path = PathBuilder::new(&reg).curve_toward("s", "e", "corner", 3.0).unwrap().finish().unwrap();
        let Segment::Curve { from, ctrl1, ctrl2, to } = &path.segments()[0] else {
            panic!("expected a curve");
        };
        let mid = cubic_at(from.point, *ctrl1, *ctrl2, to.point, 0.5);
        assert_relative_eq!(mid.distance(Point::new(0.0, 10.0)), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn polyline_and_from_segments() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let closed = Path::polyline(&pts, true).unwrap();
        assert_eq!(closed.segments().len(), 3);
        assert_eq!(closed.end(), closed.start());

        let err = Path::polyline(&pts[..2], true).unwrap_err();
        assert_eq!(err, Error::DegeneratePath { found: 2, required: 3 });

        let broken = vec![
            Segment::Line { from: Anchor::at(pts[0]), to: Anchor::at(pts[1]) },
            Segment::Line { from: Anchor::at(pts[2]), to: Anchor::at(pts[0]) },
        ];
        assert!(matches!(Path::from_segments(broken, false), Err(Error::DiscontinuousPath { .. })));
    }

    #[test]
    fn mirroring_reflects_every_coordinate() {
        let reg = square_registry();
        let path = PathBuilder::new(&reg).line(&["a", "b"]).unwrap().finish().unwrap();
        let m = path.mirrored(0.0);
        assert_eq!(m.end(), Point::new(-50.0, 0.0));
    }
}
