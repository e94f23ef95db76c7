//! Garment drafters.
//!
//! Each drafter turns a [`MeasurementSet`] into a [`Pattern`] by placing
//! named points and running them through the same builder API any caller
//! would use. Required measurements are checked before any point is placed.

mod trousers;
mod tshirt;

pub use trousers::{draft_trousers, TROUSER_MEASUREMENTS};
pub use tshirt::{draft_tshirt, TSHIRT_MEASUREMENTS};

use crate::dart::PathPosition;
use crate::error::Result;
use crate::flatten::Flattener;
use crate::measurements::MeasurementSet;
use crate::pattern::Pattern;
use crate::piece::PieceBuilder;
use crate::registry::PointRegistry;

/// Style choices that are not body measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftOptions {
    /// T-shirt: 25 cm sleeve instead of full length.
    pub short_sleeve: bool,
    /// Trousers: add a waist dart to the front.
    pub waist_dart: bool,
    /// Seam allowance in cm; 0 drafts net pieces.
    pub seam_allowance: f64,
    /// Turn-up below hem lines and sleeve ends, in cm; 0 leaves them raw.
    pub hem_width: f64,
    pub flattener: Flattener,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            short_sleeve: false,
            waist_dart: false,
            seam_allowance: 1.0,
            hem_width: 0.0,
            flattener: Flattener::default(),
        }
    }
}

impl DraftOptions {
    pub fn with_short_sleeve(mut self, short_sleeve: bool) -> Self {
        self.short_sleeve = short_sleeve;
        self
    }

    pub fn with_waist_dart(mut self, waist_dart: bool) -> Self {
        self.waist_dart = waist_dart;
        self
    }

    pub fn with_seam_allowance(mut self, seam_allowance: f64) -> Self {
        self.seam_allowance = seam_allowance;
        self
    }

    pub fn with_hem_width(mut self, hem_width: f64) -> Self {
        self.hem_width = hem_width;
        self
    }

    pub fn with_flattener(mut self, flattener: Flattener) -> Self {
        self.flattener = flattener;
        self
    }
}

/// Hem the outline from point `from` to point `to` when a hem width is set.
fn hem_between(
    builder: PieceBuilder,
    reg: &PointRegistry,
    from: &str,
    to: &str,
    options: &DraftOptions,
) -> Result<PieceBuilder> {
    if options.hem_width <= 0.0 {
        return Ok(builder);
    }
    Ok(builder.hem(PathPosition::Near(reg.resolve(from)?), PathPosition::Near(reg.resolve(to)?), options.hem_width))
}

/// Available garments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Garment {
    TShirt,
    Trousers,
}

impl Garment {
    pub fn all() -> &'static [Garment] {
        &[Garment::TShirt, Garment::Trousers]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Garment::TShirt => "tshirt",
            Garment::Trousers => "trousers",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Garment::TShirt => "T-shirt block: front, back and sleeve",
            Garment::Trousers => "Trouser block: front and back",
        }
    }

    /// Parse a garment name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Garment> {
        match name.to_lowercase().as_str() {
            "tshirt" | "t-shirt" | "tee" => Some(Garment::TShirt),
            "trousers" | "pants" | "pant" => Some(Garment::Trousers),
            _ => None,
        }
    }

    pub fn required_measurements(&self) -> &'static [&'static str] {
        match self {
            Garment::TShirt => TSHIRT_MEASUREMENTS,
            Garment::Trousers => TROUSER_MEASUREMENTS,
        }
    }

    pub fn draft(&self, measurements: &MeasurementSet, options: &DraftOptions) -> Result<Pattern> {
        match self {
            Garment::TShirt => draft_tshirt(measurements, options),
            Garment::Trousers => draft_trousers(measurements, options),
        }
    }
}

/// Measurement sets used by the drafter tests and the CLI's `--example`.
pub mod samples {
    use crate::measurements::MeasurementSet;

    /// A medium men's T-shirt.
    pub fn tshirt() -> MeasurementSet {
        MeasurementSet::new()
            .with("chest", 100.0)
            .with("half_back", 19.0)
            .with("back_neck_to_waist", 44.0)
            .with("scye_depth", 21.0)
            .with("neck_size", 39.0)
            .with("sleeve_length", 64.0)
            .with("close_wrist", 17.0)
            .with("finished_length", 72.0)
    }

    /// A medium pair of trousers.
    pub fn trousers() -> MeasurementSet {
        MeasurementSet::new()
            .with("body_rise", 28.0)
            .with("inside_leg", 80.0)
            .with("seat_measurement", 100.0)
            .with("waist_measurement", 82.0)
    }
}
