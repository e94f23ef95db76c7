//! T-shirt block: front, back and a long or short sleeve.
//!
//! Body pieces are drafted as the right half, centre line on x = 0, neck at
//! the top (y = 0) and hem at the finished length. The sleeve is drafted the
//! same way with its centre line on x = 0.
//!
//! ```text
//!   0   6                       x →
//!   +---7------11
//!   |    \       \
//!   4     ..      9 (armhole)
//!   |               \
//!   3--------8-------12
//!   |                 |
//!   2-----------------13
//! ```

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

pub const TSHIRT_MEASUREMENTS: &[&str] = &[
    "chest",
    "half_back",
    "back_neck_to_waist",
    "scye_depth",
    "neck_size",
    "sleeve_length",
    "close_wrist",
    "finished_length",
];

const SHORT_SLEEVE_LENGTH: f64 = 25.0;
const WRIST_EASE: f64 = 3.5;
/// Sleeve head control point sits a third of the way back from point 18.
const SLEEVE_HEAD_DIVISOR: f64 = 3.0;
const NOTCH_LENGTH: f64 = 0.6;

/// Measurements with ease applied, plus the derived shoulder and underarm
/// positions every piece shares.
#[derive(Debug, Clone, Copy)]
struct Sizes {
    half_back: f64,
    back_neck_to_waist: f64,
    scye_depth: f64,
    neck_size: f64,
    sleeve_length: f64,
    close_wrist: f64,
    finished_length: f64,
    /// Quarter chest plus ease.
    underarm_width: f64,
}

impl Sizes {
    fn new(m: &MeasurementSet) -> Result<Self> {
        m.require(TSHIRT_MEASUREMENTS)?;
        Ok(Self {
            half_back: m.with_ease("half_back", 1.0, 2.0)?,
            back_neck_to_waist: m.value("back_neck_to_waist")?,
            scye_depth: m.with_ease("scye_depth", 1.0, 2.5)?,
            neck_size: m.value("neck_size")?,
            sleeve_length: m.value("sleeve_length")?,
            close_wrist: m.value("close_wrist")?,
            finished_length: m.value("finished_length")?,
            underarm_width: m.value("chest")? / 4.0 + m.ease(2.5, 4.0),
        })
    }

    fn shoulder_height(&self) -> f64 {
        self.scye_depth / 2.0 / 4.0
    }

    fn shoulder_width(&self) -> f64 {
        self.half_back + 0.75
    }

    fn shoulder_point(&self) -> Point {
        Point::new(self.shoulder_width(), self.shoulder_height())
    }

    fn underarm_point(&self) -> Point {
        Point::new(self.underarm_width, self.scye_depth)
    }

    /// Bodice armhole length; the sleeve head is drafted to match it.
    fn armhole_length(&self) -> f64 {
        self.shoulder_point().distance(self.underarm_point())
    }

    /// Construction points shared by front and back.
    fn body_points(&self) -> Result<PointRegistry> {
        let mut reg = PointRegistry::new();
        reg.define("0", 0.0, 0.0);
        reg.define("1", 0.0, self.back_neck_to_waist + 1.0);
        reg.define("2", 0.0, self.finished_length);
        reg.define("3", 0.0, self.scye_depth);
        reg.define_on_line("4", "0", "3", 0.5)?;
        reg.define("5", 0.0, self.shoulder_height());
        reg.define("6", self.neck_size / 5.0 - 1.0, 0.0);
        reg.define_relative("7", "6", 0.0, -1.5)?;
        reg.define("8", self.half_back, self.scye_depth);
        reg.define("9", self.half_back, self.scye_depth / 2.0);
        reg.define("10", self.half_back, self.shoulder_height());
        reg.define("11", self.shoulder_width(), self.shoulder_height());
        reg.define("12", self.underarm_width, self.scye_depth);
        reg.define("13", self.underarm_width, self.finished_length);
        Ok(reg)
    }
}

fn finish_piece(
    name: &str,
    builder: PieceBuilder,
    reg: &PointRegistry,
    options: &DraftOptions,
) -> Result<PatternPiece> {
    builder
        .seam_allowance(options.seam_allowance)
        .flattener(options.flattener)
        .labels(reg.snapshot())
        .assemble()
        .inspect(|p| debug!("drafted {} ({:.0} cm²)", name, p.area()))
}

fn front(sizes: &Sizes, options: &DraftOptions) -> Result<PatternPiece> {
    let mut reg = sizes.body_points()?;
    reg.define("14", 0.0, sizes.neck_size / 5.0 - 2.0);

    let outline = PathBuilder::new(&reg)
        .line(&["7", "11"])?
        .curve_with_peak("11", "9", 0.25, 0.3)?
        .curve_with_peak("9", "12", 2.5, 0.7)?
        .line(&["12", "13", "2", "14"])?
        .curve_with_peak("14", "7", 2.5, 0.5)?
        .close()?;

    let builder = PieceBuilder::new("Front", outline)
        .fold_line(reg.resolve("14")?, reg.resolve("2")?)
        .notch(PathPosition::Near(reg.resolve("9")?), NOTCH_LENGTH);
    let builder = hem_between(builder, &reg, "13", "2", options)?;
    finish_piece("Front", builder, &reg, options)
}

fn back(sizes: &Sizes, options: &DraftOptions) -> Result<PatternPiece> {
    let reg = sizes.body_points()?;

    let outline = PathBuilder::new(&reg)
        .curve_with_peak("0", "7", 0.75, 0.8)?
        .line(&["7", "11"])?
        .curve_with_peak("11", "9", 0.25, 0.3)?
        .curve_with_peak("9", "12", 2.5, 0.7)?
        .line(&["12", "13", "2", "0"])?
        .close()?;

    let builder = PieceBuilder::new("Back", outline)
        .fold_line(reg.resolve("0")?, reg.resolve("2")?)
        .notch(PathPosition::Near(reg.resolve("9")?), NOTCH_LENGTH);
    let builder = hem_between(builder, &reg, "13", "2", options)?;
    finish_piece("Back", builder, &reg, options)
}

fn sleeve(sizes: &Sizes, options: &DraftOptions) -> Result<PatternPiece> {
    let half_scye = sizes.scye_depth / 2.0;
    let armhole = sizes.armhole_length();
    let length = if options.short_sleeve { SHORT_SLEEVE_LENGTH } else { sizes.sleeve_length };
    // Sleeve head width from the armhole length (Pythagoras on the cap).
    let cap_width = (armhole * armhole - half_scye * half_scye).max(0.0).sqrt() + 2.5;

    let mut reg = PointRegistry::new();
    reg.define("15", 0.0, 0.0);
    reg.define("16", 0.0, half_scye);
    reg.define("17", 0.0, length);
    let p18 = reg.define("18", cap_width, half_scye);
    reg.define("19", cap_width, length);
    reg.define_relative("20", "18", -p18.x / SLEEVE_HEAD_DIVISOR, -half_scye / SLEEVE_HEAD_DIVISOR)?;

    let (name, outline) = if options.short_sleeve {
        let hem = ((armhole + 2.5).powi(2) - half_scye * half_scye).max(0.0).sqrt() - 4.0;
        let p21 = reg.define("21", hem, length);
        let bow = p18.distance(p21) * 0.15;
        let reference = p18.lerp(p21, 0.4) + Point::new(0.0, bow);
        reg.define("22", reference.x, reference.y);
        let outline = PathBuilder::new(&reg)
            .curve_with_peak("18", "20", -0.75, 0.5)?
            .curve_with_peak("20", "15", 2.0, 0.5)?
            .line(&["15", "17", "21"])?
            .curve_toward("21", "18", "22", bow)?
            .close()?;
        ("Short Sleeve", outline)
    } else {
        reg.define("21", sizes.close_wrist / 2.0 + WRIST_EASE, length);
        let outline = PathBuilder::new(&reg)
            .curve_with_peak("18", "20", -0.75, 0.5)?
            .curve_with_peak("20", "15", 2.0, 0.5)?
            .line(&["15", "17", "21"])?
            .curve_with_peak("21", "18", -2.0, 0.5)?
            .close()?;
        ("Long Sleeve", outline)
    };
    let builder = PieceBuilder::new(name, outline)
        .fold_line(reg.resolve("15")?, reg.resolve("17")?)
        .notch(PathPosition::Near(reg.resolve("20")?), NOTCH_LENGTH);
    let builder = hem_between(builder, &reg, "17", "21", options)?;
    finish_piece(name, builder, &reg, options)
}

/// Draft front, back and sleeve.
pub fn draft_tshirt(measurements: &MeasurementSet, options: &DraftOptions) -> Result<Pattern> {
    let sizes = Sizes::new(measurements)?;
    let pieces = vec![front(&sizes, options)?, back(&sizes, options)?, sleeve(&sizes, options)?];
    Ok(Pattern::new("T-shirt", measurements.clone(), pieces))
}
