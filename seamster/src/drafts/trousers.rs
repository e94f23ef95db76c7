//! Trouser block: front and back.
//!
//! Waist at the top (y = 0), side seam along x = 0 and the crotch extending
//! to the right. Knee and hem lines are squared across from the side seam.

use log::debug;

use crate::dart::PathPosition;
use crate::drafts::{hem_between, DraftOptions};
use crate::error::Result;
use crate::geometry::Point;
use crate::measurements::MeasurementSet;
use crate::path::PathBuilder;
use crate::pattern::Pattern;
use crate::piece::{PatternPiece, PieceBuilder};
use crate::registry::PointRegistry;

pub const TROUSER_MEASUREMENTS: &[&str] = &["body_rise", "inside_leg", "seat_measurement", "waist_measurement"];

const NOTCH_LENGTH: f64 = 0.6;
const WAIST_DART_DEPTH: f64 = 9.0;
const MAX_DART_INTAKE: f64 = 3.0;

#[derive(Debug, Clone, Copy)]
struct Sizes {
    body_rise: f64,
    inside_leg: f64,
    seat: f64,
    waist: f64,
    hip_ease: f64,
    waist_ease: f64,
    /// Crotch point shift: out for a loose fit, in for a close one.
    crotch_shift: f64,
    ease_fitting: bool,
}

impl Sizes {
    fn new(m: &MeasurementSet) -> Result<Self> {
        m.require(TROUSER_MEASUREMENTS)?;
        Ok(Self {
            body_rise: m.value("body_rise")?,
            inside_leg: m.value("inside_leg")?,
            seat: m.value("seat_measurement")?,
            waist: m.value("waist_measurement")?,
            hip_ease: m.ease(2.0, 4.0),
            waist_ease: m.ease(1.0, 2.0),
            crotch_shift: m.ease(-0.5, 0.5),
            ease_fitting: m.ease_fitting(),
        })
    }

    fn seat_width(&self) -> f64 {
        self.seat / 4.0
    }

    fn crotch_height(&self) -> f64 {
        self.body_rise + self.hip_ease
    }

    fn knee_height(&self) -> f64 {
        self.body_rise + self.inside_leg / 2.0
    }

    fn leg_length(&self) -> f64 {
        self.body_rise + self.inside_leg
    }

    fn leg_middle(&self) -> f64 {
        self.seat / 4.0 / 2.0 + 1.0
    }

    fn crotch_point(&self) -> Point {
        Point::new(self.body_rise + self.body_rise / 4.0 + self.crotch_shift, self.crotch_height())
    }

    fn common_points(&self) -> Result<PointRegistry> {
        let sw = self.seat_width();
        let ch = self.crotch_height();
        let knee = self.knee_height();
        let leg = self.leg_length();
        let mid = self.leg_middle();
        let crotch = self.crotch_point();

        let mut reg = PointRegistry::new();
        reg.define("0", 0.0, 0.0);
        reg.define("1", 0.0, ch);
        reg.define("2", 0.0, leg);
        reg.define("3", 0.0, knee);
        reg.define("4", sw, ch);
        reg.define("5", sw, 0.0);
        reg.define_relative("6", "5", -1.0, 0.0)?;
        reg.define("8", crotch.x, crotch.y);
        reg.define("9", mid, ch);
        reg.define("10", mid, knee);
        reg.define("11", mid, leg);
        reg.define("12", mid - sw / 3.0 - 1.0, leg);
        reg.define("13", mid + sw / 3.0 + 1.0, leg);
        Ok(reg)
    }
}

fn finish_piece(builder: PieceBuilder, reg: &PointRegistry, options: &DraftOptions) -> Result<PatternPiece> {
    builder
        .seam_allowance(options.seam_allowance)
        .flattener(options.flattener)
        .labels(reg.snapshot())
        .assemble()
}

fn front(sizes: &Sizes, options: &DraftOptions) -> Result<PatternPiece> {
    let mut reg = sizes.common_points()?;
    reg.define("7", sizes.seat_width(), sizes.body_rise - sizes.body_rise / 4.0);
    reg.define_intersection("14", "1", "12", "3", "10")?;
    let knee_x = reg.resolve("10")?.x;
    reg.define_reflected("15", "14", knee_x)?;

    let outline = PathBuilder::new(&reg)
        .line(&["0", "6", "7"])?
        .curve_toward("7", "8", "4", 3.25)?
        .curve_with_peak("8", "15", 1.0, 0.5)?
        .line(&["15", "13", "11", "12", "1", "0"])?
        .close()?;

    let mut builder = PieceBuilder::new("Front", outline)
        .notch(PathPosition::Near(reg.resolve("14")?), NOTCH_LENGTH)
        .notch(PathPosition::Near(reg.resolve("15")?), NOTCH_LENGTH);

    builder = hem_between(builder, &reg, "13", "12", options)?;

    if options.waist_dart {
        // Whatever the front waist has beyond a quarter waist plus ease.
        let waist_line = reg.resolve("6")?.x;
        let intake = (waist_line - (sizes.waist / 4.0 + sizes.waist_ease)).min(MAX_DART_INTAKE);
        if intake > 0.0 {
            let centre = waist_line / 2.0;
            builder = builder.dart(
                PathPosition::Near(Point::new(centre - intake / 2.0, 0.0)),
                PathPosition::Near(Point::new(centre + intake / 2.0, 0.0)),
                Point::new(centre, WAIST_DART_DEPTH),
            );
        } else {
            debug!("waist {:.1} leaves no room for a front dart", sizes.waist);
        }
    }
    finish_piece(builder, &reg, options)
}

fn back(sizes: &Sizes, options: &DraftOptions) -> Result<PatternPiece> {
    let mut reg = sizes.common_points()?;
    reg.define_relative("16", "6", -5.0, 0.0)?;
    reg.define_relative("17", "16", 0.0, -4.0)?;
    reg.define("18", if sizes.ease_fitting { -5.0 } else { -4.0 }, 0.0);

    let p4 = reg.resolve("4")?;
    let p8 = reg.resolve("8")?;
    let crotch_ease = if sizes.ease_fitting { 1.0 } else { 0.5 };
    reg.define("19", p4.x, p4.y / 2.0);
    let p20 = reg.define("20", p8.x + (p8.x.abs() - p4.x.abs()) + crotch_ease, p4.y);
    reg.define("21", p20.x, p20.y + 1.0);
    reg.define_relative("22", "12", -1.0, 0.0)?;
    reg.define_relative("24", "13", 1.0, 0.0)?;
    reg.define_intersection("23", "18", "22", "3", "10")?;
    let knee_x = reg.resolve("10")?.x;
    reg.define_reflected("25", "23", knee_x)?;

    let seat_curve = if sizes.ease_fitting { 6.0 } else { 5.5 };
    let outline = PathBuilder::new(&reg)
        .curve_toward("19", "21", "4", seat_curve)?
        .curve_with_peak("21", "25", 2.0, 0.5)?
        .line(&["25", "24", "22", "18", "17", "19"])?
        .close()?;

    let builder = PieceBuilder::new("Back", outline)
        .notch(PathPosition::Near(reg.resolve("23")?), NOTCH_LENGTH)
        .notch(PathPosition::Near(reg.resolve("25")?), NOTCH_LENGTH);
    let builder = hem_between(builder, &reg, "24", "22", options)?;
    finish_piece(builder, &reg, options)
}

/// Draft the trouser front and back.
pub fn draft_trousers(measurements: &MeasurementSet, options: &DraftOptions) -> Result<Pattern> {
    let sizes = Sizes::new(measurements)?;
    let pieces = vec![front(&sizes, options)?, back(&sizes, options)?];
    Ok(Pattern::new("Trousers", measurements.clone(), pieces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::samples;
    use approx::assert_relative_eq;

    #[test]
    fn drafts_front_and_back() {
        let pattern = draft_trousers(&samples::trousers(), &DraftOptions::default()).unwrap();
        assert_eq!(pattern.pieces.len(), 2);
        let front = pattern.piece("Front").unwrap();
        // Hem at body rise + inside leg, plus the allowance.
        assert_relative_eq!(front.bounding_box.max_y, 109.0, epsilon = 1e-6);
        assert_eq!(front.notches.len(), 2);
        assert!(front.darts.is_empty());
    }

    #[test]
    fn knee_notches_are_mirrored_about_the_leg_middle() {
        let pattern = draft_trousers(&samples::trousers(), &DraftOptions::default()).unwrap();
        let front = pattern.piece("Front").unwrap();
        let (a, b) = (front.notches[0].at, front.notches[1].at);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        assert_relative_eq!((a.x + b.x) / 2.0, 13.5, epsilon = 1e-9);
    }

    #[test]
    fn waist_dart_goes_into_the_cut_line_only() {
        let plain = draft_trousers(&samples::trousers(), &DraftOptions::default()).unwrap();
        let darted =
            draft_trousers(&samples::trousers(), &DraftOptions::default().with_waist_dart(true)).unwrap();
        let (p, d) = (plain.piece("Front").unwrap(), darted.piece("Front").unwrap());

        assert_eq!(d.darts.len(), 1);
        // 24 cm front waist less (82 / 4 + 1).
        assert_relative_eq!(d.darts[0].intake(), 2.5, epsilon = 1e-9);
        assert_eq!(d.darts[0].apex, Point::new(12.0, WAIST_DART_DEPTH));
        assert_eq!(d.cut_polyline().len(), p.cut_polyline().len() + 3);
        assert_eq!(d.seam_allowance, p.seam_allowance);
    }

    #[test]
    fn hem_follows_the_leg_taper() {
        let options = DraftOptions::default().with_hem_width(4.0);
        let pattern = draft_trousers(&samples::trousers(), &options).unwrap();
        for piece in &pattern.pieces {
            assert_eq!(piece.hems.len(), 1, "{}", piece.name);
            assert_relative_eq!(piece.bounding_box.max_y, 113.0, epsilon = 1e-6);
        }

        // The leg narrows towards the hem, so its mirror image below the fold widens.
        let hem = &pattern.piece("Front").unwrap().hems[0];
        let span = |pts: &[Point]| {
            let xs = pts.iter().map(|p| p.x);
            xs.clone().fold(f64::NEG_INFINITY, f64::max) - xs.fold(f64::INFINITY, f64::min)
        };
        assert!(span(&hem.edge) > span(&hem.fold));
        assert!(hem.fold.iter().all(|p| (p.y - 108.0).abs() < 1e-9));
    }

    #[test]
    fn tight_waist_gets_no_dart() {
        let m = samples::trousers().with("waist_measurement", 100.0);
        let pattern = draft_trousers(&m, &DraftOptions::default().with_waist_dart(true)).unwrap();
        assert!(pattern.piece("Front").unwrap().darts.is_empty());
    }
}
