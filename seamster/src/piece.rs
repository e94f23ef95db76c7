//! Pattern pieces: a cut line plus everything derived from it.
//!
//! [`PieceBuilder`] collects the cut line and the requested darts, hems,
//! notches and allowance, then [`PieceBuilder::assemble`] runs the whole
//! pipeline in one go:
//!
//! 1. flatten the cut line and apply darts in declaration order
//! 2. place hems on the undarted outline
//! 3. offset the undarted, hemmed outline by the seam allowance
//! 4. place notches on the undarted outline
//! 5. compute the bounding box over all of it
//!
//! Any failure aborts the piece; there is no half-built piece.

use log::debug;

use crate::dart::{Dart, DartedOutline, PathPosition};
use crate::error::{Error, Result};
use crate::flatten::Flattener;
use crate::geometry::{BoundingBox, Line, Point};
use crate::hem::{apply_hems, place_hem, Hem};
use crate::notch::{place_notch, Notch, NotchStyle};
use crate::offset::{offset_polyline, OffsetOptions};
use crate::path::Path;
use crate::polyline::Polyline;

/// A finished pattern piece.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPiece {
    pub name: String,
    /// The line fabric is cut along, dart wedges and hems included.
    pub cut_line: Path,
    /// The cut line as drafted, before darts.
    pub base_outline: Path,
    /// Seam-allowance line, if an allowance was requested.
    pub seam_allowance: Option<Path>,
    /// Allowance distance in cm (0 when there is none).
    pub allowance: f64,
    pub darts: Vec<Dart>,
    pub hems: Vec<Hem>,
    pub notches: Vec<Notch>,
    pub fold_line: Option<Line>,
    pub labels: Vec<(String, Point)>,
    pub bounding_box: BoundingBox,
    /// Settings the piece was flattened with; exporters reuse them.
    pub flattener: Flattener,
    outline: DartedOutline,
}

impl PatternPiece {
    /// Flattened cut line.
    pub fn cut_polyline(&self) -> Polyline {
        self.flattener.flatten(&self.cut_line)
    }

    /// Flattened seam-allowance line.
    pub fn allowance_polyline(&self) -> Option<Polyline> {
        self.seam_allowance.as_ref().map(|p| self.flattener.flatten(p))
    }

    /// The outline with every dart stitched closed.
    pub fn sewn_outline(&self) -> Polyline {
        self.outline.sewn_path()
    }

    /// Enclosed area of the undarted outline, in cm².
    pub fn area(&self) -> f64 {
        self.outline.base().signed_area().abs()
    }

    /// Length of the sewn seam line, in cm.
    pub fn perimeter(&self) -> f64 {
        self.outline.sewn_path().length()
    }

    /// The piece mirrored across `x = mirror_x`, e.g. to draft the left half
    /// from the right.
    pub fn mirrored(&self, mirror_x: f64) -> PatternPiece {
        let flip = |p: Point| Point::new(2.0 * mirror_x - p.x, p.y);
        let bb = self.bounding_box;
        PatternPiece {
            name: format!("{} (mirrored)", self.name),
            cut_line: self.cut_line.mirrored(mirror_x),
            base_outline: self.base_outline.mirrored(mirror_x),
            seam_allowance: self.seam_allowance.as_ref().map(|p| p.mirrored(mirror_x)),
            allowance: self.allowance,
            darts: self.outline.mirrored(mirror_x).darts().to_vec(),
            hems: self.hems.iter().map(|h| h.mirrored(mirror_x)).collect(),
            notches: self
                .notches
                .iter()
                .map(|n| Notch { at: flip(n.at), normal: Point::new(-n.normal.x, n.normal.y), ..*n })
                .collect(),
            fold_line: self.fold_line.map(|l| l.mirrored(mirror_x)),
            labels: self.labels.iter().map(|(id, p)| (id.clone(), flip(*p))).collect(),
            bounding_box: BoundingBox {
                min_x: 2.0 * mirror_x - bb.max_x,
                min_y: bb.min_y,
                max_x: 2.0 * mirror_x - bb.min_x,
                max_y: bb.max_y,
            },
            flattener: self.flattener,
            outline: self.outline.mirrored(mirror_x),
        }
    }
}

/// Collects the inputs of a piece.
#[derive(Debug, Clone)]
pub struct PieceBuilder {
    name: String,
    cut_line: Path,
    allowance: Option<f64>,
    offset_options: OffsetOptions,
    darts: Vec<(PathPosition, PathPosition, Point)>,
    hems: Vec<(PathPosition, PathPosition, f64)>,
    notches: Vec<(PathPosition, f64, NotchStyle)>,
    fold_line: Option<Line>,
    labels: Vec<(String, Point)>,
    flattener: Flattener,
}

impl PieceBuilder {
    pub fn new(name: impl Into<String>, cut_line: Path) -> Self {
        Self {
            name: name.into(),
            cut_line,
            allowance: None,
            offset_options: OffsetOptions::default(),
            darts: Vec::new(),
            hems: Vec::new(),
            notches: Vec::new(),
            fold_line: None,
            labels: Vec::new(),
            flattener: Flattener::default(),
        }
    }

    /// Add a seam allowance of `distance` cm.
    pub fn seam_allowance(mut self, distance: f64) -> Self {
        self.allowance = Some(distance);
        self
    }

    /// Miter/bevel settings for the allowance. The distance comes from
    /// [`seam_allowance`](Self::seam_allowance).
    pub fn offset_options(mut self, options: OffsetOptions) -> Self {
        self.offset_options = options;
        self
    }

    pub fn dart(mut self, leg_a: impl Into<PathPosition>, leg_b: impl Into<PathPosition>, apex: Point) -> Self {
        self.darts.push((leg_a.into(), leg_b.into(), apex));
        self
    }

    /// Fold the outline from `from` to `to` (in outline order) back on
    /// itself, adding `width` cm of hem below the fold.
    pub fn hem(mut self, from: impl Into<PathPosition>, to: impl Into<PathPosition>, width: f64) -> Self {
        self.hems.push((from.into(), to.into(), width));
        self
    }

    /// An outward notch.
    pub fn notch(self, position: impl Into<PathPosition>, length: f64) -> Self {
        self.notch_styled(position, length, NotchStyle::Outward)
    }

    pub fn notch_styled(mut self, position: impl Into<PathPosition>, length: f64, style: NotchStyle) -> Self {
        self.notches.push((position.into(), length, style));
        self
    }

    /// Mark the edge from `a` to `b` as "place on fold".
    pub fn fold_line(mut self, a: Point, b: Point) -> Self {
        self.fold_line = Some(Line::from_points(a, b));
        self
    }

    /// Point labels, usually `registry.snapshot()`.
    pub fn labels(mut self, labels: Vec<(String, Point)>) -> Self {
        self.labels = labels;
        self
    }

    pub fn flattener(mut self, flattener: Flattener) -> Self {
        self.flattener = flattener;
        self
    }

    /// Run the pipeline and produce the piece.
    pub fn assemble(self) -> Result<PatternPiece> {
        let mut outline = DartedOutline::new(&self.cut_line, &self.flattener)?;
        for (a, b, apex) in &self.darts {
            outline = outline.insert_dart(*a, *b, *apex)?;
        }

        let mut hems: Vec<Hem> = Vec::with_capacity(self.hems.len());
        for (from, to, width) in &self.hems {
            let hem = place_hem(outline.base(), *from, *to, *width)?;
            let clash = outline.darts().iter().any(|d| hem.overlaps(d.start, d.end))
                || hems.iter().any(|h| hem.overlaps(h.start, h.end));
            if clash {
                return Err(Error::InvalidHem(format!(
                    "fold [{:.3}, {:.3}] overlaps a dart or another hem",
                    hem.start, hem.end
                )));
            }
            hems.push(hem);
        }

        let (seam_allowance, allowance) = match self.allowance {
            Some(d) if d != 0.0 => {
                let options = self.offset_options.with_distance(d);
                let hemmed = apply_hems(outline.base(), &hems)?;
                (Some(offset_polyline(&hemmed, &options)?.to_path()?), d)
            }
            _ => (None, 0.0),
        };

        let notches = self
            .notches
            .iter()
            .map(|(pos, len, style)| place_notch(outline.base(), *pos, *len, *style))
            .collect::<Result<Vec<_>>>()?;

        let cut_line = if outline.darts().is_empty() && hems.is_empty() {
            self.cut_line.clone()
        } else {
            apply_hems(&outline.cutting_path(), &hems)?.to_path()?
        };

        let mut points: Vec<Point> = self.flattener.vertices(&cut_line).collect();
        if let Some(sa) = &seam_allowance {
            points.extend(self.flattener.vertices(sa));
        }
        for d in outline.darts() {
            points.extend([d.leg_a, d.apex, d.leg_b]);
        }
        for h in &hems {
            points.extend(h.fold.iter().copied());
        }
        for n in &notches {
            let tick = n.tick();
            points.extend([tick.start(), tick.end()]);
        }
        if let Some(fold) = &self.fold_line {
            points.extend([fold.start(), fold.end()]);
        }
        let bounding_box =
            BoundingBox::from_points(&points).ok_or(Error::DegeneratePath { found: 0, required: 3 })?;

        debug!(
            "assembled '{}': {} darts, {} hems, {} notches, {:.1} x {:.1} cm",
            self.name,
            outline.darts().len(),
            hems.len(),
            notches.len(),
            bounding_box.width(),
            bounding_box.height()
        );

        Ok(PatternPiece {
            name: self.name,
            cut_line,
            base_outline: self.cut_line,
            seam_allowance,
            allowance,
            darts: outline.darts().to_vec(),
            hems,
            notches,
            fold_line: self.fold_line,
            labels: self.labels,
            bounding_box,
            flattener: self.flattener,
            outline,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
