//! Seam-allowance offsetting.
//!
//! Takes a closed outline and walks every vertex of its flattened polyline,
//! pushing the two incident edges outward by the allowance and joining them:
//!
//! ```text
//!        miter            bevel (turn too sharp / miter too long)
//!          *              *---*
//!         / \            /     \
//!   -----+   +-----  ---+       +---
//! ```
//!
//! Concave corners are joined at the intersection of the offset edges. The
//! miter limit applies to them as well: at very sharp concave corners the two
//! offset edges are simply emitted as-is and the allowance overlaps itself
//! locally. Cutters handle that by hand, so the overlap is kept.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::flatten::Flattener;
use crate::geometry::{Point, EPSILON};
use crate::path::Path;
use crate::polyline::Polyline;

/// Default maximum miter length, as a multiple of the offset distance.
pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Default turn angle (degrees) above which a corner is bevelled.
pub const DEFAULT_BEVEL_ANGLE: f64 = 150.0;

/// Largest accepted bevel angle. A full reversal always bevels.
pub const MAX_BEVEL_ANGLE: f64 = 179.0;

/// Offset settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetOptions {
    /// Offset distance in cm. Positive is outward.
    pub distance: f64,
    /// Longest allowed miter, as a multiple of `distance`.
    pub miter_limit: f64,
    /// Corners turning more than this many degrees are bevelled. Read
    /// clamped to `0..=MAX_BEVEL_ANGLE`.
    pub bevel_angle_degrees: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            distance: 1.0,
            miter_limit: DEFAULT_MITER_LIMIT,
            bevel_angle_degrees: DEFAULT_BEVEL_ANGLE,
        }
    }
}

impl OffsetOptions {
    pub fn new(distance: f64) -> Self {
        Self { distance, ..Self::default() }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    pub fn with_bevel_angle(mut self, degrees: f64) -> Self {
        self.bevel_angle_degrees = degrees.clamp(0.0, MAX_BEVEL_ANGLE);
        self
    }
}

/// Offset a closed path and return the allowance as a closed line path.
///
/// The result keeps the input's winding. Curves are not reconstructed: the
/// allowance of a curved outline is its flattened polygon.
pub fn offset_path(path: &Path, options: &OffsetOptions, flattener: &Flattener) -> Result<Path> {
    let flat = flattener.flatten(path);
    if !path.is_closed() {
        return Err(Error::DegeneratePath { found: flat.len(), required: 3 });
    }
    offset_polyline(&flat, options)?.to_path()
}

/// Offset a closed polyline.
pub fn offset_polyline(outline: &Polyline, options: &OffsetOptions) -> Result<Polyline> {
    let pts = outline.points();
    let n = pts.len();
    if !outline.is_closed() || n < 3 {
        return Err(Error::DegeneratePath { found: n, required: 3 });
    }
    let area = outline.signed_area();
    if area.abs() < EPSILON {
        // Every vertex on one line: no interior to be outside of.
        return Err(Error::DegeneratePath { found: n, required: 3 });
    }
    let d = options.distance;
    if d == 0.0 {
        return Ok(outline.clone());
    }

    // Edge i runs pts[i] -> pts[i + 1]; all edges are non-zero after
    // flattening collapsed duplicates.
    let mut dirs = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = outline.edge(i);
        dirs.push((b - a).normalized().ok_or(Error::DegeneratePath { found: n, required: 3 })?);
    }
    let normals: Vec<Point> = dirs.iter().map(|u| outward_normal(*u, area)).collect();

    let cos_bevel = options.bevel_angle_degrees.clamp(0.0, MAX_BEVEL_ANGLE).to_radians().cos();
    let miter_max = options.miter_limit * d.abs();
    let mut out = Vec::with_capacity(n + 8);
    let mut bevels = 0usize;

    for i in 0..n {
        let prev = (i + n - 1) % n;
        let p = pts[i];
        let (u0, u1) = (dirs[prev], dirs[i]);
        let (n0, n1) = (normals[prev], normals[i]);
        let cos_turn = u0.dot(u1);
        let cross = u0.cross(u1);

        if cross.abs() < 1e-12 && cos_turn > 0.0 {
            out.push(p + n1 * d);
            continue;
        }

        // The clamped bevel angle keeps 1 + cos_turn away from zero here.
        let sharp = cos_turn < cos_bevel;
        let joint = p + (n0 + n1) * (d / (1.0 + cos_turn));

        if sharp || joint.distance(p) > miter_max {
            bevels += 1;
            out.push(p + n0 * d);
            out.push(p + n1 * d);
        } else {
            out.push(joint);
        }
    }

    if bevels > 0 {
        warn!("offset bevelled {} of {} corners", bevels, n);
    }
    debug!("offset {} vertices by {:.2} -> {} vertices", n, d, out.len());
    Ok(Polyline::new(out, true))
}

/// Normal pointing away from the interior for an edge with direction `u`.
pub(crate) fn outward_normal(u: Point, area: f64) -> Point {
    if area > 0.0 { Point::new(u.y, -u.x) } else { Point::new(-u.y, u.x) }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathBuilder;
    use crate::registry::PointRegistry;

    fn poly(pts: &[(f64, f64)]) -> Polyline {
        Polyline::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect(), true)
    }

    fn assert_points(actual: &[Point], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "vertex count: {:?}", actual);
        for (a, &(x, y)) in actual.iter().zip(expected) {
            assert!(a.approx_eq(Point::new(x, y), 1e-9), "expected ({}, {}), got {:?}", x, y, a);
        }
    }

    #[test]
    fn square_gets_exact_miter_corners() {
        let square = Path::polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 50.0),
            ],
            true,
        )
        .unwrap();
        let out = offset_path(&square, &OffsetOptions::new(1.0), &Flattener::default()).unwrap();
        let flat = Flattener::default().flatten(&out);
        assert_points(flat.points(), &[(-1.0, -1.0), (51.0, -1.0), (51.0, 51.0), (-1.0, 51.0)]);
    }

    #[test]
    fn winding_does_not_change_the_outward_side() {
        let cw = poly(&[(0.0, 0.0), (0.0, 50.0), (50.0, 50.0), (50.0, 0.0)]);
        let out = offset_polyline(&cw, &OffsetOptions::new(1.0)).unwrap();
        assert_points(out.points(), &[(-1.0, -1.0), (-1.0, 51.0), (51.0, 51.0), (51.0, -1.0)]);
        assert!(out.signed_area() < 0.0, "winding preserved");
    }

    #[test]
    fn concave_corner_uses_intersection() {
        let l_shape = poly(&[(0.0, 0.0), (20.0, 0.0), (20.0, 10.0), (10.0, 10.0), (10.0, 20.0), (0.0, 20.0)]);
        let out = offset_polyline(&l_shape, &OffsetOptions::new(1.0)).unwrap();
        assert_eq!(out.len(), 6);
        assert!(out.points()[3].approx_eq(Point::new(11.0, 11.0), 1e-9), "got {:?}", out.points()[3]);
    }

    #[test]
    fn narrow_slot_overlaps_itself() {
        // 1 cm slot cut up from the hem; a 1 cm allowance folds its walls past each other.
        let slotted = poly(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (5.5, 10.0),
            (5.5, 3.0),
            (4.5, 3.0),
            (4.5, 10.0),
            (0.0, 10.0),
        ]);
        let out = offset_polyline(&slotted, &OffsetOptions::new(1.0)).unwrap();
        assert_eq!(out.len(), 8);
        // The slot's top edge comes back reversed: left-to-right where the input runs right-to-left.
        assert!(out.points()[4].approx_eq(Point::new(4.5, 4.0), 1e-9), "got {:?}", out.points()[4]);
        assert!(out.points()[5].approx_eq(Point::new(5.5, 4.0), 1e-9), "got {:?}", out.points()[5]);
    }

    #[test]
    fn sharp_spike_is_bevelled() {
        let spike = poly(&[(0.0, 0.0), (10.0, 0.0), (0.0, 1.0)]);
        let out = offset_polyline(&spike, &OffsetOptions::new(1.0)).unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn miter_limit_forces_bevel() {
        let square = poly(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 50.0)]);
        // A right-angle miter is sqrt(2) * d long.
        let out = offset_polyline(&square, &OffsetOptions::new(1.0).with_miter_limit(1.2)).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn bevel_angle_stays_below_a_full_turn() {
        assert_eq!(OffsetOptions::default().with_bevel_angle(200.0).bevel_angle_degrees, MAX_BEVEL_ANGLE);

        // Slits cut down from the top edge: one a thin V, one folding straight back.
        let v_slit =
            poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.05, 10.0), (5.0, 1.0), (4.95, 10.0), (0.0, 10.0)]);
        let slit = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 10.0), (5.0, 2.0), (5.0, 10.0), (0.0, 10.0)]);
        for outline in [&v_slit, &slit] {
            let mut options = OffsetOptions::new(1.0).with_miter_limit(100.0);
            options.bevel_angle_degrees = 180.0;
            for options in [options, OffsetOptions::new(1.0).with_bevel_angle(180.0)] {
                let out = offset_polyline(outline, &options).unwrap();
                for p in out.points() {
                    assert!(p.x.is_finite() && p.y.is_finite(), "{:?}", p);
                    assert!(outline.distance_to(*p) <= options.miter_limit + 1e-9, "{:?} runs away", p);
                }
            }
        }
    }

    #[test]
    fn collinear_vertex_is_kept_once() {
        let rect = poly(&[(0.0, 0.0), (25.0, 0.0), (50.0, 0.0), (50.0, 10.0), (0.0, 10.0)]);
        let out = offset_polyline(&rect, &OffsetOptions::new(2.0)).unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.points()[1].approx_eq(Point::new(25.0, -2.0), 1e-9));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let two = poly(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(
            offset_polyline(&two, &OffsetOptions::default()),
            Err(Error::DegeneratePath { found: 2, required: 3 })
        );

        let flat = poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(matches!(offset_polyline(&flat, &OffsetOptions::default()), Err(Error::DegeneratePath { .. })));

        let open = Path::polyline(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)], false).unwrap();
        assert!(matches!(
            offset_path(&open, &OffsetOptions::default(), &Flattener::default()),
            Err(Error::DegeneratePath { .. })
        ));
    }

    #[test]
    fn curved_outline_stays_at_allowance_distance() {
        // Four-arc circle of radius 20.
        const K: f64 = 0.552_284_749_8 * 20.0;
        let mut reg = PointRegistry::new();
        reg.define("e", 20.0, 0.0);
        reg.define("s", 0.0, 20.0);
        reg.define("w", -20.0, 0.0);
        reg.define("n", 0.0, -20.0);
        let circle = PathBuilder::new(&reg)
            .curve("e", Point::new(20.0, K), Point::new(K, 20.0), "s")
            .unwrap()
            .curve("s", Point::new(-K, 20.0), Point::new(-20.0, K), "w")
            .unwrap()
            .curve("w", Point::new(-20.0, -K), Point::new(-K, -20.0), "n")
            .unwrap()
            .curve("n", Point::new(K, -20.0), Point::new(20.0, -K), "e")
            .unwrap()
            .close()
            .unwrap();

        let flattener = Flattener::default();
        let input = flattener.flatten(&circle);
        let allowance = 1.5;
        let out = offset_path(&circle, &OffsetOptions::new(allowance), &flattener).unwrap();
        let out = flattener.flatten(&out);

        for (a, b) in out.edges() {
            for k in 0..=10 {
                let p = a.lerp(b, k as f64 / 10.0);
                let d = input.distance_to(p);
                assert!((d - allowance).abs() < 0.05, "sample {:?} is {} from the outline", p, d);
            }
        }
    }
}
