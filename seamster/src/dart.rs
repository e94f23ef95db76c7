//! Darts: V-shaped wedges cut into a closed outline.
//!
//! A dart is attached to an interval of the outline, measured as arc-length
//! fractions of the *undarted* base. The base is kept untouched and the two
//! views are derived from it on demand:
//!
//! ```text
//!   cutting view                      sewn view
//!
//!   ----A       B----                 ----S----
//!        \     /                          |
//!         \   /                          (fold line S→apex)
//!          \ /
//!         apex
//! ```
//!
//! The cutting view replaces the interval with `A → apex → B`. The sewn view
//! replaces it with a single stitched point `S` halfway between the legs and
//! drops the apex. Because the base is never modified, removing a dart gives
//! back exactly the outline it was inserted into.
//!
//! The outline is closed, so two legs split it into two arcs. A dart always
//! takes the shorter one, which may run across the outline's start.

use log::debug;

use crate::error::{Error, Result};
use crate::flatten::Flattener;
use crate::geometry::{Line, Point, EPSILON};
use crate::path::Path;
use crate::polyline::Polyline;

/// Where on an outline something attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathPosition {
    /// Arc-length fraction in `[0, 1]` from the outline's start.
    Fraction(f64),
    /// The boundary point closest to this coordinate.
    Near(Point),
}

impl PathPosition {
    /// Resolve to an arc-length fraction on `outline`.
    pub fn resolve(&self, outline: &Polyline) -> Result<f64> {
        match *self {
            PathPosition::Fraction(f) if (0.0..=1.0).contains(&f) => Ok(f),
            PathPosition::Fraction(f) => Err(Error::InvalidPosition(f)),
            PathPosition::Near(p) => Ok(outline.project(p)?.fraction),
        }
    }
}

impl From<f64> for PathPosition {
    fn from(f: f64) -> Self {
        PathPosition::Fraction(f)
    }
}

impl From<Point> for PathPosition {
    fn from(p: Point) -> Self {
        PathPosition::Near(p)
    }
}

/// One dart on an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dart {
    pub leg_a: Point,
    pub apex: Point,
    pub leg_b: Point,
    /// Arc-length fraction of `leg_a` on the base outline.
    pub start: f64,
    /// Arc-length fraction of `leg_b`. Less than `start` when the dart
    /// runs across the outline's start point.
    pub end: f64,
}

impl Dart {
    pub fn legs(&self) -> (Line, Line) {
        (Line::from_points(self.leg_a, self.apex), Line::from_points(self.apex, self.leg_b))
    }

    /// Where the two legs meet once sewn.
    pub fn stitched_point(&self) -> Point {
        self.leg_a.lerp(self.leg_b, 0.5)
    }

    /// Centre fold from the apex to the stitched point.
    pub fn fold_line(&self) -> Line {
        Line::from_points(self.apex, self.stitched_point())
    }

    /// Width of fabric taken up at the outline.
    pub fn intake(&self) -> f64 {
        self.leg_a.distance(self.leg_b)
    }

    /// True when the interval runs across fraction 0.
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// Whether base fraction `s` falls inside the interval, ends included.
    fn covers(&self, s: f64) -> bool {
        let after_start = s >= self.start - EPSILON;
        let before_end = s <= self.end + EPSILON;
        if self.wraps() { after_start || before_end } else { after_start && before_end }
    }

    fn overlaps(&self, start: f64, end: f64) -> bool {
        arcs_overlap((self.start, self.end), (start, end))
    }
}

/// Whether two arcs of a closed outline share any length. Either may wrap.
pub(crate) fn arcs_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    let ours = arc_pieces(a.0, a.1);
    let theirs = arc_pieces(b.0, b.1);
    ours.iter()
        .flatten()
        .any(|x| theirs.iter().flatten().any(|y| x.0 < y.1 && y.0 < x.1))
}

/// A possibly wrapping interval as at most two plain ones.
fn arc_pieces(start: f64, end: f64) -> [Option<(f64, f64)>; 2] {
    if end < start {
        [Some((start, 1.0)), Some((0.0, end))]
    } else {
        [Some((start, end)), None]
    }
}

/// A closed base outline plus the darts inserted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct DartedOutline {
    base: Polyline,
    /// Sorted by `start`; intervals never overlap.
    darts: Vec<Dart>,
}

impl DartedOutline {
    /// Flatten a closed path and use it as the base.
    pub fn new(path: &Path, flattener: &Flattener) -> Result<Self> {
        let base = flattener.flatten(path);
        if !path.is_closed() {
            return Err(Error::DegeneratePath { found: base.len(), required: 3 });
        }
        Self::from_polyline(base)
    }

    pub fn from_polyline(base: Polyline) -> Result<Self> {
        if !base.is_closed() || base.len() < 3 {
            return Err(Error::DegeneratePath { found: base.len(), required: 3 });
        }
        Ok(Self { base, darts: Vec::new() })
    }

    /// The undarted outline.
    pub fn base(&self) -> &Polyline {
        &self.base
    }

    pub fn darts(&self) -> &[Dart] {
        &self.darts
    }

    /// Add a dart between two boundary positions, returning the new outline.
    ///
    /// The legs may be given in either order; the dart takes the shorter arc
    /// between them. Fails if that arc overlaps the open interval of a dart
    /// already present.
    pub fn insert_dart(&self, leg_a: PathPosition, leg_b: PathPosition, apex: Point) -> Result<Self> {
        let fa = leg_a.resolve(&self.base)?;
        let fb = leg_b.resolve(&self.base)?;
        let (lo, hi) = if fa <= fb { (fa, fb) } else { (fb, fa) };
        // Forward arc lo..hi, or the wrapping arc hi..1..lo.
        let (start, end, span) = if hi - lo <= 0.5 { (lo, hi, hi - lo) } else { (hi, lo, 1.0 - (hi - lo)) };
        if span < EPSILON {
            return Err(Error::DegeneratePath { found: 1, required: 2 });
        }
        if let Some(existing) = self.darts.iter().find(|d| d.overlaps(start, end)) {
            return Err(Error::OverlappingDart {
                start,
                end,
                existing_start: existing.start,
                existing_end: existing.end,
            });
        }

        let dart = Dart {
            leg_a: self.base.locate(start)?.point,
            apex,
            leg_b: self.base.locate(end)?.point,
            start,
            end,
        };
        debug!("dart [{:.3}, {:.3}] intake {:.2} cm{}", start, end, dart.intake(), if dart.wraps() { " (wraps)" } else { "" });

        let mut darts = self.darts.clone();
        let at = darts.partition_point(|d| d.start < start);
        darts.insert(at, dart);
        Ok(Self { base: self.base.clone(), darts })
    }

    /// Drop the dart at `index`; `None` if there is no such dart.
    pub fn remove_dart(&self, index: usize) -> Option<Self> {
        if index >= self.darts.len() {
            return None;
        }
        let mut darts = self.darts.clone();
        darts.remove(index);
        Some(Self { base: self.base.clone(), darts })
    }

    /// Mirror base and darts across `x = mirror_x`. Arc-length fractions are
    /// unchanged since vertex order is kept.
    pub fn mirrored(&self, mirror_x: f64) -> Self {
        let flip = |p: Point| Point::new(2.0 * mirror_x - p.x, p.y);
        Self {
            base: self.base.mirrored(mirror_x),
            darts: self
                .darts
                .iter()
                .map(|d| Dart { leg_a: flip(d.leg_a), apex: flip(d.apex), leg_b: flip(d.leg_b), ..*d })
                .collect(),
        }
    }

    /// The outline to cut along, dart wedges included.
    pub fn cutting_path(&self) -> Polyline {
        self.splice(|d, out| {
            out.push(d.leg_a);
            out.push(d.apex);
            out.push(d.leg_b);
        })
    }

    /// The outline as it looks once every dart is stitched closed.
    pub fn sewn_path(&self) -> Polyline {
        self.splice(|d, out| out.push(d.stitched_point()))
    }

    /// Walk the base, replacing each dart interval with whatever `emit`
    /// pushes. Base vertices inside an interval (ends included) are dropped;
    /// a leg landing on a vertex stands in for it.
    fn splice<F>(&self, mut emit: F) -> Polyline
    where
        F: FnMut(&Dart, &mut Vec<Point>),
    {
        let pts = self.base.points();
        let cum = self.base.cumulative_lengths();
        let total = cum[cum.len() - 1];
        let mut out = Vec::with_capacity(pts.len() + 3 * self.darts.len());
        let mut pending = self.darts.iter().peekable();

        for (i, &p) in pts.iter().enumerate() {
            let s = cum[i] / total;
            while let Some(d) = pending.next_if(|d| d.start <= s + EPSILON) {
                emit(d, &mut out);
            }
            let covered = self.darts.iter().any(|d| d.covers(s));
            if !covered {
                out.push(p);
            }
        }
        // Darts on the closing edge, or wrapping past the start.
        for d in pending {
            emit(d, &mut out);
        }
        Polyline::new(out, true)
    }
}

/// Flatten `path` and insert a single dart.
pub fn insert_dart(
    path: &Path,
    leg_a: PathPosition,
    leg_b: PathPosition,
    apex: Point,
    flattener: &Flattener,
) -> Result<DartedOutline> {
    DartedOutline::new(path, flattener)?.insert_dart(leg_a, leg_b, apex)
}

// ============================================================================
// TESTS
// ============================================================================
