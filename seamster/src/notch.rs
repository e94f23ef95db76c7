//! Notches: short alignment ticks on a seam line.
//!
//! A notch never changes the outline it sits on; it only adds a tick.

use crate::dart::PathPosition;
use crate::error::{Error, Result};
use crate::geometry::{Line, Point, EPSILON};
use crate::offset::outward_normal;
use crate::polyline::Polyline;

/// How far either side of the outline the inside test looks, in cm.
const SIDE_STEP: f64 = 1e-4;

/// How the tick sits relative to the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotchStyle {
    /// From the outline out into the seam allowance.
    #[default]
    Outward,
    /// Straddling the outline, half in and half out.
    Centered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notch {
    /// Arc-length fraction along the outline.
    pub position: f64,
    /// Point on the outline.
    pub at: Point,
    /// Unit normal pointing away from the piece.
    pub normal: Point,
    pub length: f64,
    pub style: NotchStyle,
}

impl Notch {
    /// The tick to draw.
    pub fn tick(&self) -> Line {
        match self.style {
            NotchStyle::Outward => Line::from_points(self.at, self.at + self.normal * self.length),
            NotchStyle::Centered => {
                let half = self.normal * (self.length / 2.0);
                Line::from_points(self.at - half, self.at + half)
            }
        }
    }
}

/// Place a notch of `length` cm at `position` on `outline`.
///
/// On a closed outline the tick points away from the interior; on an open one
/// it points to the left of the direction of travel. On a vertex the two edge
/// normals are averaged, so 0.0 and 1.0 on a closed outline give the same
/// notch.
pub fn place_notch(outline: &Polyline, position: PathPosition, length: f64, style: NotchStyle) -> Result<Notch> {
    let fraction = position.resolve(outline)?;
    let loc = outline.locate(fraction)?;
    let n = outline.len();
    let area = outline.signed_area();
    let closed = outline.is_closed();

    let edge_normal = |i: usize| -> Result<Point> {
        let (a, b) = outline.edge(i);
        let u = (b - a).normalized().ok_or(Error::DegeneratePath { found: n, required: 2 })?;
        Ok(if closed { outward_normal(u, area) } else { u.perp() })
    };

    let vertex = if loc.t < EPSILON {
        Some(loc.edge)
    } else if loc.t > 1.0 - EPSILON {
        Some((loc.edge + 1) % n)
    } else {
        None
    };

    let normal = match vertex {
        None => edge_normal(loc.edge)?,
        Some(v) => {
            let incoming = if closed { Some((v + n - 1) % n) } else { v.checked_sub(1) };
            let outgoing = if closed || v + 1 < n { Some(v) } else { None };
            match (incoming, outgoing) {
                (Some(i), Some(o)) => {
                    let (ni, no) = (edge_normal(i)?, edge_normal(o)?);
                    (ni + no).normalized().unwrap_or(no)
                }
                (Some(e), None) | (None, Some(e)) => edge_normal(e)?,
                (None, None) => return Err(Error::DegeneratePath { found: n, required: 2 }),
            }
        }
    };

    // A self-crossing outline has lobes wound against its total area.
    let inside_ahead = outline.contains(loc.point + normal * SIDE_STEP);
    let inside_behind = outline.contains(loc.point - normal * SIDE_STEP);
    let normal = if closed && inside_ahead && !inside_behind {
        -normal
    } else {
        normal
    };

    Ok(Notch { position: fraction, at: loc.point, normal, length, style })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dart::PathPosition::{Fraction, Near};

    fn square() -> Polyline {
        Polyline::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 50.0),
            ],
            true,
        )
    }

    #[test]
    fn start_and_end_coincide() {
        let sq = square();
        let a = place_notch(&sq, Fraction(0.0), 1.0, NotchStyle::Outward).unwrap();
        let b = place_notch(&sq, Fraction(1.0), 1.0, NotchStyle::Outward).unwrap();
        assert!(a.at.approx_eq(b.at, 1e-12));
        assert!(a.tick().end().approx_eq(b.tick().end(), 1e-12));
    }

    #[test]
    fn mid_edge_notch_points_outward() {
        let sq = square();
        // 0.375 is the middle of the right-hand edge.
        let notch = place_notch(&sq, Fraction(0.375), 0.5, NotchStyle::Outward).unwrap();
        assert!(notch.at.approx_eq(Point::new(50.0, 25.0), 1e-9));
        assert!(notch.tick().end().approx_eq(Point::new(50.5, 25.0), 1e-9));
    }

    #[test]
    fn centered_tick_straddles_the_outline() {
        let sq = square();
        let notch = place_notch(&sq, Near(Point::new(20.0, -3.0)), 1.0, NotchStyle::Centered).unwrap();
        let tick = notch.tick();
        assert!(tick.start().approx_eq(Point::new(20.0, 0.5), 1e-9));
        assert!(tick.end().approx_eq(Point::new(20.0, -0.5), 1e-9));
        assert!(tick.midpoint().approx_eq(notch.at, 1e-9));
    }

    #[test]
    fn corner_normal_is_the_bisector() {
        let sq = square();
        let notch = place_notch(&sq, Fraction(0.25), 1.0, NotchStyle::Outward).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(notch.normal.approx_eq(Point::new(h, -h), 1e-9), "got {:?}", notch.normal);
    }

    #[test]
    fn notch_leaves_the_outline_alone() {
        let sq = square();
        let before = sq.clone();
        let _ = place_notch(&sq, Fraction(0.6), 1.0, NotchStyle::default()).unwrap();
        assert_eq!(sq, before);
    }

    #[test]
    fn out_of_range_position() {
        let sq = square();
        assert_eq!(
            place_notch(&sq, Fraction(1.01), 1.0, NotchStyle::Outward),
            Err(Error::InvalidPosition(1.01))
        );
    }

    #[test]
    fn notch_on_a_reversed_lobe_still_points_out() {
        // Bow tie crossing at (30/11, 0); the small left lobe winds against the total.
        let bow_tie = Polyline::new(
            vec![
                Point::new(0.0, -2.0),
                Point::new(30.0, 20.0),
                Point::new(30.0, -20.0),
                Point::new(0.0, 2.0),
            ],
            true,
        );
        assert!(bow_tie.signed_area() < 0.0);
        let notch = place_notch(&bow_tie, Near(Point::new(-1.0, 0.0)), 1.0, NotchStyle::Outward).unwrap();
        assert!(notch.at.approx_eq(Point::new(0.0, 0.0), 1e-9), "got {:?}", notch.at);
        assert!(notch.normal.approx_eq(Point::new(-1.0, 0.0), 1e-9), "got {:?}", notch.normal);
        assert!(!bow_tie.contains(notch.tick().end()));
    }

    #[test]
    fn open_outline_uses_left_normal() {
        let line = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)], false);
        let notch = place_notch(&line, Fraction(1.0), 1.0, NotchStyle::Outward).unwrap();
        assert!(notch.at.approx_eq(Point::new(10.0, 0.0), 1e-12));
        assert!(notch.normal.approx_eq(Point::new(0.0, 1.0), 1e-12));
    }
}
