//! Clipping against page cells, plus point-in-polygon.
//!
//! The tiler cuts every stroke of a piece against the printable rectangle of
//! each page. Strokes are polylines, so clipping one yields zero or more
//! *runs*: maximal stretches of the polyline that stay inside the cell.
//! [`Clipped::whole`] says whether nothing at all was cut away, which is the
//! only case where a closed outline may still be drawn closed.

use crate::geometry::{BoundingBox, Point, EPSILON};

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside.
#[inline]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

// ============================================================================
// SEGMENT / RECTANGLE (Liang-Barsky)
// ============================================================================

/// Clip segment `a`-`b` to `rect`.
///
/// Returns the parameters `(t0, t1)` of the visible part, `0 <= t0 <= t1 <= 1`,
/// or `None` when the segment misses the rectangle entirely.
pub fn clip_segment_params(a: Point, b: Point, rect: &BoundingBox) -> Option<(f64, f64)> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    // ## Rust Lesson #14: Arrays of Tuples
    //
    // Each (p, q) pair is one rectangle edge: the segment is outside that edge
    // where p*t > q. A fixed array iterates without allocating.
    let edges = [
        (-d.x, a.x - rect.min_x),
        (d.x, rect.max_x - a.x),
        (-d.y, a.y - rect.min_y),
        (d.y, rect.max_y - a.y),
    ];

    for (p, q) in edges {
        if p.abs() < EPSILON {
            // Parallel to this edge: fully in or fully out.
            if q < -EPSILON {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((t0, t1))
}

// ============================================================================
// POLYLINE / RECTANGLE
// ============================================================================

/// Result of clipping one polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clipped {
    /// Visible stretches, in input order.
    pub runs: Vec<Vec<Point>>,
    /// No edge lost any length: the polyline lies entirely inside.
    pub whole: bool,
}

/// Clip a polyline to `rect`.
///
/// Consecutive visible edges are joined into one run. A closed polyline that
/// lies entirely inside comes back as a single run with its first point
/// repeated at the end, so callers can draw it as is.
pub fn clip_polyline(points: &[Point], closed: bool, rect: &BoundingBox) -> Clipped {
    if points.len() < 2 {
        return Clipped::default();
    }

    let edge_count = if closed { points.len() } else { points.len() - 1 };
    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut cut = false;

    for i in 0..edge_count {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        match clip_segment_params(a, b, rect) {
            Some((t0, t1)) => {
                if t0 > EPSILON || t1 < 1.0 - EPSILON {
                    cut = true;
                }
                let start = a.lerp(b, t0);
                let end = a.lerp(b, t1);
                // A run continues only if this edge starts where the last one ended.
                if t0 > EPSILON && !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    current.push(start);
                }
                if !end.approx_eq(start, EPSILON) || current.len() == 1 {
                    current.push(end);
                }
                if t1 < 1.0 - EPSILON {
                    runs.push(std::mem::take(&mut current));
                }
            }
            None => {
                cut = true;
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    // On a closed outline the last run may continue straight into the first.
    if closed && runs.len() > 1 {
        let joins = match (runs.last().and_then(|r| r.last()), runs[0].first()) {
            (Some(tail), Some(head)) => tail.approx_eq(*head, EPSILON),
            _ => false,
        };
        if joins {
            if let Some(mut last) = runs.pop() {
                last.extend(runs[0].iter().skip(1).copied());
                runs[0] = last;
            }
        }
    }

    runs.retain(|r| r.len() >= 2);
    Clipped { whole: !cut, runs }
}

// ============================================================================
// TESTS
// ============================================================================
