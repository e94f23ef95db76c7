//! Hems: a fold-back extension along one stretch of an outline.
//!
//! The stretch between two positions, walked in outline order, becomes the
//! fold line. The cut line is pushed past it by the hem width, and the sides
//! meeting the fold are mirrored across it, so the turned-up hem lies flat
//! against the sides it is stitched to:
//!
//! ```text
//!    \           /           \           /
//!     \         /             \         /
//!      +-------+      ->       +- - - -+     fold
//!                             /         \
//!                            +-----------+   hem edge
//! ```
//!
//! Darts and notches keep working on the undarted outline; [`apply_hems`]
//! splices the hem edges into whichever outline is being drawn.

use log::debug;

use crate::dart::{arcs_overlap, PathPosition};
use crate::error::{Error, Result};
use crate::geometry::{Point, EPSILON};
use crate::offset::{outward_normal, DEFAULT_BEVEL_ANGLE, DEFAULT_MITER_LIMIT};
use crate::polyline::{Location, Polyline};

/// Mirrored sides climbing away from the fold at less than this sine are
/// squared off instead.
const MIN_SIDE_RISE: f64 = 0.25;

/// One hem on a closed outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Hem {
    /// Arc-length fraction of the fold's first end on the undarted outline.
    pub start: f64,
    /// Fraction of its last end. Less than `start` when the fold runs across
    /// the outline's start point.
    pub end: f64,
    pub width: f64,
    /// The fold line: the outline from `start` to `end`.
    pub fold: Vec<Point>,
    /// What the cut line follows instead of the fold, corner to corner.
    pub edge: Vec<Point>,
}

impl Hem {
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// Whether the fold shares any length with the arc `start..end`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        arcs_overlap((self.start, self.end), (start, end))
    }

    pub fn mirrored(&self, mirror_x: f64) -> Hem {
        let flip = |p: &Point| Point::new(2.0 * mirror_x - p.x, p.y);
        Hem {
            start: self.start,
            end: self.end,
            width: self.width,
            fold: self.fold.iter().map(flip).collect(),
            edge: self.edge.iter().map(flip).collect(),
        }
    }
}

/// Hem `outline` by `width` cm, folding along the stretch from `from` to
/// `to` in outline order.
pub fn place_hem(outline: &Polyline, from: PathPosition, to: PathPosition, width: f64) -> Result<Hem> {
    let n = outline.len();
    if !outline.is_closed() || n < 3 {
        return Err(Error::DegeneratePath { found: n, required: 3 });
    }
    if !width.is_finite() || width <= 0.0 {
        return Err(Error::InvalidHem(format!("width must be positive, got {:.2}", width)));
    }

    let mut start = from.resolve(outline)?;
    let mut end = to.resolve(outline)?;
    if start > 1.0 - EPSILON {
        start = 0.0;
    }
    if end < EPSILON {
        end = 1.0;
    }
    if (end - start).rem_euclid(1.0) < EPSILON {
        return Err(Error::InvalidHem(format!("both ends of the fold are at {:.3}", start)));
    }
    let wraps = end < start;

    let pts = outline.points();
    let cum = outline.cumulative_lengths();
    let total = cum[cum.len() - 1];
    let inside = |f: f64| {
        let after_start = f > start + EPSILON;
        let before_end = f < end - EPSILON;
        if wraps { after_start || before_end } else { after_start && before_end }
    };

    let first = outline.locate(start)?;
    let last = outline.locate(end)?;
    let mut fold = vec![first.point];
    for k in 1..=n {
        let i = (first.edge + k) % n;
        if inside(cum[i] / total) {
            fold.push(pts[i]);
        }
    }
    fold.push(last.point);
    let fold = Polyline::new(fold, false).into_points();
    if fold.len() < 2 {
        return Err(Error::InvalidHem(format!("fold [{:.3}, {:.3}] has no length", start, end)));
    }

    let area = outline.signed_area();
    let k = fold.len() - 1;
    let direction =
        |a: Point, b: Point| (b - a).normalized().ok_or(Error::DegeneratePath { found: k + 1, required: 2 });

    let mut edge = vec![fold[0]];
    edge.push(mirrored_corner(fold[0], direction(fold[0], fold[1])?, previous_vertex(outline, &first), area, width));
    let cos_bevel = DEFAULT_BEVEL_ANGLE.to_radians().cos();
    for j in 1..k {
        let (u0, u1) = (direction(fold[j - 1], fold[j])?, direction(fold[j], fold[j + 1])?);
        let (n0, n1) = (outward_normal(u0, area), outward_normal(u1, area));
        let cos_turn = u0.dot(u1);
        let joint = fold[j] + (n0 + n1) * (width / (1.0 + cos_turn));
        if cos_turn < cos_bevel || joint.distance(fold[j]) > DEFAULT_MITER_LIMIT * width {
            edge.push(fold[j] + n0 * width);
            edge.push(fold[j] + n1 * width);
        } else {
            edge.push(joint);
        }
    }
    edge.push(mirrored_corner(fold[k], direction(fold[k - 1], fold[k])?, next_vertex(outline, &last), area, width));
    edge.push(fold[k]);

    debug!(
        "hem [{:.3}, {:.3}] {:.1} cm wide along {} fold vertices{}",
        start,
        end,
        width,
        fold.len(),
        if wraps { " (wraps)" } else { "" }
    );
    Ok(Hem { start, end, width, fold, edge })
}

/// Where the side meeting the fold at `corner` reaches the hem edge once
/// mirrored across the fold. `along` is the fold's direction at the corner.
fn mirrored_corner(corner: Point, along: Point, side: Point, area: f64, width: f64) -> Point {
    let normal = outward_normal(along, area);
    let mirrored = (side - corner).normalized().map(|v| v - normal * (2.0 * v.dot(normal)));
    match mirrored {
        Some(m) if m.dot(normal) > MIN_SIDE_RISE => corner + m * (width / m.dot(normal)),
        _ => corner + normal * width,
    }
}

/// The outline vertex before `loc`, skipping a vertex `loc` sits on.
fn previous_vertex(outline: &Polyline, loc: &Location) -> Point {
    let n = outline.len();
    if loc.t < EPSILON {
        outline.points()[(loc.edge + n - 1) % n]
    } else {
        outline.points()[loc.edge]
    }
}

/// The outline vertex after `loc`, skipping a vertex `loc` sits on.
fn next_vertex(outline: &Polyline, loc: &Location) -> Point {
    let n = outline.len();
    if loc.t > 1.0 - EPSILON {
        outline.points()[(loc.edge + 2) % n]
    } else {
        outline.points()[(loc.edge + 1) % n]
    }
}

/// Replace each hem's fold on the closed `outline` with its edge.
///
/// The folds are found again by projecting their corners, so `outline` may
/// be the undarted base or the cutting path with dart wedges in it.
pub fn apply_hems(outline: &Polyline, hems: &[Hem]) -> Result<Polyline> {
    if hems.is_empty() {
        return Ok(outline.clone());
    }
    let mut spans = Vec::with_capacity(hems.len());
    for hem in hems {
        let (Some(first), Some(last)) = (hem.fold.first(), hem.fold.last()) else {
            continue;
        };
        spans.push((outline.project(*first)?.fraction, outline.project(*last)?.fraction, hem));
    }
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let covered = |f: f64| {
        spans.iter().any(|&(s, e, _)| {
            let after_start = f >= s - EPSILON;
            let before_end = f <= e + EPSILON;
            if e < s { after_start || before_end } else { after_start && before_end }
        })
    };

    let pts = outline.points();
    let cum = outline.cumulative_lengths();
    let total = cum[cum.len() - 1];
    let mut out = Vec::with_capacity(pts.len() + hems.iter().map(|h| h.edge.len()).sum::<usize>());
    let mut pending = spans.iter().peekable();
    for (i, &p) in pts.iter().enumerate() {
        let f = cum[i] / total;
        while let Some((_, _, hem)) = pending.next_if(|(s, _, _)| *s <= f + EPSILON) {
            out.extend_from_slice(&hem.edge);
        }
        if !covered(f) {
            out.push(p);
        }
    }
    // Folds starting on the closing edge.
    for (_, _, hem) in pending {
        out.extend_from_slice(&hem.edge);
    }
    Ok(Polyline::new(out, true))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dart::PathPosition::{Fraction, Near};

    fn poly(pts: &[(f64, f64)]) -> Polyline {
        Polyline::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect(), true)
    }

    fn assert_points(actual: &[Point], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "vertex count: {:?}", actual);
        for (a, &(x, y)) in actual.iter().zip(expected) {
            assert!(a.approx_eq(Point::new(x, y), 1e-9), "expected ({}, {}), got {:?}", x, y, a);
        }
    }

    /// 20 x 40 body, hem along the bottom (y = 40) walking right to left.
    fn body() -> Polyline {
        poly(&[(0.0, 0.0), (20.0, 0.0), (20.0, 40.0), (0.0, 40.0)])
    }

    #[test]
    fn square_hem_drops_straight_down() {
        let outline = body();
        let hem = place_hem(&outline, Near(Point::new(20.0, 40.0)), Near(Point::new(0.0, 40.0)), 3.0).unwrap();
        assert_points(&hem.fold, &[(20.0, 40.0), (0.0, 40.0)]);
        assert_points(&hem.edge, &[(20.0, 40.0), (20.0, 43.0), (0.0, 43.0), (0.0, 40.0)]);
        assert!(!hem.wraps());

        // The fold corners stay on the cut line.
        let cut = apply_hems(&outline, &[hem]).unwrap();
        assert_points(
            cut.points(),
            &[(0.0, 0.0), (20.0, 0.0), (20.0, 40.0), (20.0, 43.0), (0.0, 43.0), (0.0, 40.0)],
        );
        assert!((cut.signed_area().abs() - 20.0 * 43.0).abs() < 1e-9);
    }

    #[test]
    fn tapered_sides_are_mirrored_below_the_fold() {
        // Sides narrow by 2 cm towards the hem on each side.
        let leg = poly(&[(0.0, 0.0), (24.0, 0.0), (22.0, 40.0), (2.0, 40.0)]);
        let hem = place_hem(&leg, Near(Point::new(22.0, 40.0)), Near(Point::new(2.0, 40.0)), 4.0).unwrap();
        // Mirrored, each side flares back out by 4 * 2/40 = 0.2 cm.
        assert_points(&hem.edge, &[(22.0, 40.0), (22.2, 44.0), (1.8, 44.0), (2.0, 40.0)]);

        // Folded up, the hem corners land on the sides.
        let folded = |p: Point| Point::new(p.x, 80.0 - p.y);
        assert!(leg.distance_to(folded(hem.edge[1])) < 1e-9);
        assert!(leg.distance_to(folded(hem.edge[2])) < 1e-9);
    }

    #[test]
    fn curved_fold_is_offset_by_the_width() {
        let skirt = poly(&[(0.0, 0.0), (20.0, 0.0), (20.0, 40.0), (10.0, 42.0), (0.0, 40.0)]);
        let hem = place_hem(&skirt, Near(Point::new(20.0, 40.0)), Near(Point::new(0.0, 40.0)), 2.0).unwrap();
        assert_eq!(hem.fold.len(), 3);
        assert_eq!(hem.edge.len(), 5);
        // The inner joint sits 2 cm off the line of both fold segments.
        let joint = hem.edge[2];
        for w in hem.fold.windows(2) {
            let u = (w[1] - w[0]).normalized().unwrap();
            let d = (joint - w[0]).cross(u).abs();
            assert!((d - 2.0).abs() < 1e-9, "joint {:?} is {} from the fold", joint, d);
        }
        assert!(joint.y > 42.0);
    }

    #[test]
    fn fold_across_the_start_point() {
        // Same body, but the outline starts in the middle of the hem.
        let outline = poly(&[(10.0, 40.0), (0.0, 40.0), (0.0, 0.0), (20.0, 0.0), (20.0, 40.0)]);
        let hem = place_hem(&outline, Near(Point::new(20.0, 40.0)), Near(Point::new(0.0, 40.0)), 3.0).unwrap();
        assert!(hem.wraps());
        assert_points(&hem.fold, &[(20.0, 40.0), (10.0, 40.0), (0.0, 40.0)]);

        let cut = apply_hems(&outline, &[hem]).unwrap();
        assert!((cut.signed_area().abs() - 20.0 * 43.0).abs() < 1e-9);
        assert!(!cut.points().iter().any(|p| p.approx_eq(Point::new(10.0, 40.0), 1e-9)));
        assert!(cut.points().iter().any(|p| p.approx_eq(Point::new(10.0, 43.0), 1e-9)));
    }

    #[test]
    fn winding_does_not_change_the_outward_side() {
        let cw = poly(&[(0.0, 0.0), (0.0, 40.0), (20.0, 40.0), (20.0, 0.0)]);
        let hem = place_hem(&cw, Near(Point::new(0.0, 40.0)), Near(Point::new(20.0, 40.0)), 3.0).unwrap();
        assert_points(&hem.edge, &[(0.0, 40.0), (0.0, 43.0), (20.0, 43.0), (20.0, 40.0)]);
    }

    #[test]
    fn bad_hems_are_rejected() {
        let outline = body();
        let corner = Near(Point::new(20.0, 40.0));
        assert!(matches!(place_hem(&outline, corner, corner, 3.0), Err(Error::InvalidHem(_))));
        assert!(matches!(
            place_hem(&outline, corner, Near(Point::new(0.0, 40.0)), 0.0),
            Err(Error::InvalidHem(_))
        ));
        assert_eq!(place_hem(&outline, Fraction(1.5), corner, 3.0), Err(Error::InvalidPosition(1.5)));

        let open = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)], false);
        assert!(matches!(place_hem(&open, Fraction(0.1), Fraction(0.2), 1.0), Err(Error::DegeneratePath { .. })));
    }

    #[test]
    fn overlap_follows_the_fold() {
        let hem = place_hem(&body(), Fraction(0.4), Fraction(0.6), 2.0).unwrap();
        assert!(hem.overlaps(0.5, 0.7));
        assert!(hem.overlaps(0.9, 0.45));
        assert!(!hem.overlaps(0.6, 0.8));
    }
}
