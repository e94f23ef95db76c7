//! A drafted pattern: named pieces plus the measurements behind them.

use crate::geometry::BoundingBox;
use crate::measurements::MeasurementSet;
use crate::piece::PatternPiece;

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: String,
    pub measurements: MeasurementSet,
    pub pieces: Vec<PatternPiece>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, measurements: MeasurementSet, pieces: Vec<PatternPiece>) -> Self {
        Self { name: name.into(), measurements, pieces }
    }

    /// Look a piece up by name.
    pub fn piece(&self, name: &str) -> Option<&PatternPiece> {
        self.pieces.iter().find(|p| p.name == name)
    }

    /// Box around every piece as drafted (pieces overlap in pattern space;
    /// each is laid out separately on export).
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.pieces
            .iter()
            .map(|p| p.bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Fabric area of all pieces, in cm².
    pub fn total_area(&self) -> f64 {
        self.pieces.iter().map(PatternPiece::area).sum()
    }
}
