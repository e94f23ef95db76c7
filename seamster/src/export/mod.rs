//! Page layout for printing.
//!
//! [`layout`] turns assembled pieces into an [`ExportArtifact`]: a list of
//! pages, each holding the strokes and labels that fall on it in page
//! coordinates (cm, origin top-left, y down). Serializers never see pattern
//! space; they only map page coordinates to their own units.
//!
//! A piece larger than the printable area is tiled. Cells step by the
//! printable size minus the overlap, so neighbouring pages share a strip of
//! `overlap` cm. Dashed lines and crosshairs in that strip line up when the
//! pages are taped together.
//!
//! ```text
//!   +--------+--+--------+
//!   | R1C1   |::| R1C2   |    :: = overlap strip, printed on both pages
//!   |        |::|        |
//!   +--------+--+--------+
//! ```
//!
//! ## Rust Lesson #24: Separating "what" from "how"
//!
//! `layout` decides what goes on each page; `svg` and `pdf` decide how to
//! write it. Adding an output format means one more consumer of
//! `ExportArtifact`, and the geometry cannot drift between formats.

pub mod pdf;
pub mod svg;

use log::{debug, info};

use crate::clip::clip_polyline;
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Point, EPSILON};
use crate::piece::PatternPiece;

pub use pdf::{render_pdf, PdfOptions};
pub use svg::render_svg;

/// PostScript points per centimetre.
pub const POINTS_PER_CM: f64 = 72.0 / 2.54;

/// Arm length of an alignment crosshair, in cm.
const CROSSHAIR_SIZE: f64 = 0.5;
const PAGE_LABEL_SIZE: f64 = 0.35;
const PIECE_LABEL_SIZE: f64 = 1.0;

// ============================================================================
// PAGE CONFIGURATION
// ============================================================================

/// Physical page in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    /// Unprintable border on every side.
    pub margin: f64,
    /// Strip shared by neighbouring tiles.
    pub overlap: f64,
}

impl Default for PageConfig {
    /// A4 portrait, 1 cm margin, 1.5 cm overlap.
    fn default() -> Self {
        Self { width: 21.0, height: 29.7, margin: 1.0, overlap: 1.5 }
    }
}

impl PageConfig {
    /// US letter portrait.
    pub fn letter() -> Self {
        Self { width: 21.59, height: 27.94, ..Self::default() }
    }

    /// One page exactly large enough for `bbox` plus `margin`, so nothing is
    /// tiled (plotters, full-size paper rolls).
    pub fn fit(bbox: &BoundingBox, margin: f64) -> Self {
        Self {
            width: bbox.width() + 2.0 * margin,
            height: bbox.height() + 2.0 * margin,
            margin,
            overlap: 0.0,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn landscape(self) -> Self {
        Self { width: self.height, height: self.width, ..self }
    }

    pub fn printable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn printable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// Reject sizes that leave no printable area or no room to step past the
    /// overlap.
    pub fn validate(&self) -> Result<()> {
        let all = [self.width, self.height, self.margin, self.overlap];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::InvalidPageConfig(format!(
                "sizes must be finite and non-negative ({:.2} x {:.2}, margin {:.2}, overlap {:.2})",
                self.width, self.height, self.margin, self.overlap
            )));
        }
        let printable = self.printable_width().min(self.printable_height());
        if printable <= EPSILON {
            return Err(Error::InvalidPageConfig(format!(
                "margin {:.2} leaves no printable area on a {:.2} x {:.2} page",
                self.margin, self.width, self.height
            )));
        }
        if self.overlap >= printable {
            return Err(Error::InvalidPageConfig(format!(
                "overlap {:.2} must be smaller than the printable area {:.2}",
                self.overlap, printable
            )));
        }
        Ok(())
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Uniform map: translate, optionally flip y, then scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate: Point,
    /// Flip y about this height (applied after translating, before scaling).
    pub flip_height: Option<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self { scale: 1.0, translate: Point::default(), flip_height: None }
    }

    pub fn translation(offset: Point) -> Self {
        Self { translate: offset, ..Self::identity() }
    }

    /// Page centimetres (y down) to PDF points (y up).
    pub fn pdf(page_height: f64) -> Self {
        Self { scale: POINTS_PER_CM, translate: Point::default(), flip_height: Some(page_height) }
    }

    pub fn apply(&self, p: Point) -> Point {
        let q = p + self.translate;
        let y = match self.flip_height {
            Some(h) => h - q.y,
            None => q.y,
        };
        Point::new(q.x * self.scale, y * self.scale)
    }
}

// ============================================================================
// TILING
// ============================================================================

/// Grid of page cells covering one bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub columns: usize,
    pub rows: usize,
    /// Pattern-space corner of the first cell.
    pub origin: Point,
    pub cell_width: f64,
    pub cell_height: f64,
    pub step_x: f64,
    pub step_y: f64,
}

impl TileGrid {
    pub fn for_box(bbox: &BoundingBox, page: &PageConfig) -> Result<TileGrid> {
        page.validate()?;
        let (pw, ph) = (page.printable_width(), page.printable_height());
        Ok(TileGrid {
            columns: tile_count(bbox.width(), pw, page.overlap),
            rows: tile_count(bbox.height(), ph, page.overlap),
            origin: Point::new(bbox.min_x, bbox.min_y),
            cell_width: pw,
            cell_height: ph,
            step_x: pw - page.overlap,
            step_y: ph - page.overlap,
        })
    }

    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_tiled(&self) -> bool {
        self.len() > 1
    }

    /// Pattern-space rectangle of cell (`row`, `column`), both 0-based.
    pub fn cell(&self, row: usize, column: usize) -> BoundingBox {
        let min_x = self.origin.x + column as f64 * self.step_x;
        let min_y = self.origin.y + row as f64 * self.step_y;
        BoundingBox { min_x, min_y, max_x: min_x + self.cell_width, max_y: min_y + self.cell_height }
    }
}

fn tile_count(extent: f64, printable: f64, overlap: f64) -> usize {
    if extent <= printable + EPSILON {
        1
    } else {
        ((extent - overlap) / (printable - overlap) - EPSILON).ceil().max(1.0) as usize
    }
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// What a stroke represents; serializers pick line style from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    CutLine,
    SeamAllowance,
    Dart,
    Notch,
    FoldLine,
    /// Where a hem turns up.
    HemLine,
    /// Overlap boundaries and crosshairs on tiled pages.
    Alignment,
}

impl StrokeKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrokeKind::CutLine => "cut-line",
            StrokeKind::SeamAllowance => "seam-allowance",
            StrokeKind::Dart => "dart",
            StrokeKind::Notch => "notch",
            StrokeKind::FoldLine => "fold-line",
            StrokeKind::HemLine => "hem-line",
            StrokeKind::Alignment => "alignment",
        }
    }

    /// Line width in cm.
    pub fn width(&self) -> f64 {
        match self {
            StrokeKind::CutLine => 0.05,
            StrokeKind::SeamAllowance | StrokeKind::Notch => 0.03,
            StrokeKind::Dart | StrokeKind::FoldLine | StrokeKind::HemLine | StrokeKind::Alignment => 0.02,
        }
    }

    /// RGB stroke colour.
    pub fn colour(&self) -> (u8, u8, u8) {
        match self {
            StrokeKind::CutLine | StrokeKind::Notch => (0, 0, 0),
            StrokeKind::SeamAllowance => (0x55, 0x55, 0x55),
            StrokeKind::Dart => (0x00, 0x50, 0xa0),
            StrokeKind::FoldLine => (0xa0, 0x00, 0x00),
            StrokeKind::HemLine => (0x00, 0x70, 0x30),
            StrokeKind::Alignment => (0x99, 0x99, 0x99),
        }
    }

    pub fn is_dashed(&self) -> bool {
        matches!(self, StrokeKind::Dart | StrokeKind::FoldLine | StrokeKind::HemLine | StrokeKind::Alignment)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Stroke { kind: StrokeKind, points: Vec<Point>, closed: bool },
    Label { text: String, at: Point, size: f64 },
}

/// One printed sheet, in page centimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub piece: String,
    /// 0-based tile position.
    pub row: usize,
    pub column: usize,
    pub width: f64,
    pub height: f64,
    pub items: Vec<PageItem>,
}

impl Page {
    /// `"Front R1C2"`: piece name plus 1-based tile position.
    pub fn label(&self) -> String {
        format!("{} R{}C{}", self.piece, self.row + 1, self.column + 1)
    }

    pub fn strokes(&self, kind: StrokeKind) -> impl Iterator<Item = &[Point]> + '_ {
        self.items.iter().filter_map(move |item| match item {
            PageItem::Stroke { kind: k, points, .. } if *k == kind => Some(points.as_slice()),
            _ => None,
        })
    }
}

/// Every page for a set of pieces, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub page: PageConfig,
    pub pages: Vec<Page>,
}

impl ExportArtifact {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_for<'a>(&'a self, piece: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages.iter().filter(move |p| p.piece == piece)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// A stroke in pattern space, before clipping.
struct SourceStroke {
    kind: StrokeKind,
    points: Vec<Point>,
    closed: bool,
}

fn piece_strokes(piece: &PatternPiece) -> Vec<SourceStroke> {
    let mut strokes = Vec::new();
    if let Some(allowance) = piece.allowance_polyline() {
        strokes.push(SourceStroke { kind: StrokeKind::SeamAllowance, points: allowance.into_points(), closed: true });
    }
    strokes.push(SourceStroke { kind: StrokeKind::CutLine, points: piece.cut_polyline().into_points(), closed: true });
    for dart in &piece.darts {
        let fold = dart.fold_line();
        strokes.push(SourceStroke { kind: StrokeKind::Dart, points: vec![fold.start(), fold.end()], closed: false });
    }
    for hem in &piece.hems {
        strokes.push(SourceStroke { kind: StrokeKind::HemLine, points: hem.fold.clone(), closed: false });
    }
    for notch in &piece.notches {
        let tick = notch.tick();
        strokes.push(SourceStroke { kind: StrokeKind::Notch, points: vec![tick.start(), tick.end()], closed: false });
    }
    if let Some(fold) = piece.fold_line {
        strokes.push(SourceStroke { kind: StrokeKind::FoldLine, points: vec![fold.start(), fold.end()], closed: false });
    }
    strokes
}

/// Dashed overlap boundaries and crosshairs for one cell, in pattern space.
fn alignment_marks(grid: &TileGrid, row: usize, column: usize, overlap: f64) -> Vec<Vec<Point>> {
    let cell = grid.cell(row, column);
    let mut marks = Vec::new();

    let mut vertical = Vec::new();
    if column > 0 {
        vertical.push(cell.min_x + overlap);
    }
    if column + 1 < grid.columns {
        vertical.push(cell.max_x - overlap);
    }
    let mut horizontal = Vec::new();
    if row > 0 {
        horizontal.push(cell.min_y + overlap);
    }
    if row + 1 < grid.rows {
        horizontal.push(cell.max_y - overlap);
    }

    let mid = cell.center();
    for x in vertical {
        marks.push(vec![Point::new(x, cell.min_y), Point::new(x, cell.max_y)]);
        marks.extend(crosshair(Point::new(x, mid.y)));
    }
    for y in horizontal {
        marks.push(vec![Point::new(cell.min_x, y), Point::new(cell.max_x, y)]);
        marks.extend(crosshair(Point::new(mid.x, y)));
    }
    marks
}

fn crosshair(at: Point) -> [Vec<Point>; 2] {
    let h = CROSSHAIR_SIZE;
    [
        vec![Point::new(at.x - h, at.y), Point::new(at.x + h, at.y)],
        vec![Point::new(at.x, at.y - h), Point::new(at.x, at.y + h)],
    ]
}

fn layout_piece(piece: &PatternPiece, page: &PageConfig) -> Result<Vec<Page>> {
    let grid = TileGrid::for_box(&piece.bounding_box, page)?;
    let strokes = piece_strokes(piece);
    let centre = piece.bounding_box.center();
    let mut pages = Vec::with_capacity(grid.len());

    for row in 0..grid.rows {
        for column in 0..grid.columns {
            let cell = grid.cell(row, column);
            let to_page = Transform::translation(Point::new(page.margin - cell.min_x, page.margin - cell.min_y));
            let mut items = Vec::new();

            for stroke in &strokes {
                let clipped = clip_polyline(&stroke.points, stroke.closed, &cell);
                // Only an outline that nothing was cut from stays closed.
                let whole = stroke.closed && clipped.whole;
                for mut run in clipped.runs {
                    if whole {
                        run.pop();
                    }
                    items.push(PageItem::Stroke {
                        kind: stroke.kind,
                        points: run.into_iter().map(|p| to_page.apply(p)).collect(),
                        closed: whole,
                    });
                }
            }

            if grid.is_tiled() {
                for mark in alignment_marks(&grid, row, column, page.overlap) {
                    items.push(PageItem::Stroke {
                        kind: StrokeKind::Alignment,
                        points: mark.into_iter().map(|p| to_page.apply(p)).collect(),
                        closed: false,
                    });
                }
            }

            if cell.contains(centre, 0.0) {
                items.push(PageItem::Label {
                    text: piece.name.clone(),
                    at: to_page.apply(centre),
                    size: PIECE_LABEL_SIZE,
                });
            }

            let mut sheet = Page {
                piece: piece.name.clone(),
                row,
                column,
                width: page.width,
                height: page.height,
                items,
            };
            sheet.items.push(PageItem::Label {
                text: sheet.label(),
                at: Point::new(page.margin + 0.2, page.margin + 0.2 + PAGE_LABEL_SIZE),
                size: PAGE_LABEL_SIZE,
            });
            pages.push(sheet);
        }
    }

    debug!("{}: {} x {} pages", piece.name, grid.columns, grid.rows);
    Ok(pages)
}

/// Lay out every piece on pages of `page` size; each piece is tiled on its
/// own.
pub fn layout(pieces: &[PatternPiece], page: &PageConfig) -> Result<ExportArtifact> {
    page.validate()?;
    let mut pages = Vec::new();
    for piece in pieces {
        pages.extend(layout_piece(piece, page)?);
    }
    info!("laid out {} pieces on {} pages", pieces.len(), pages.len());
    Ok(ExportArtifact { page: *page, pages })
}

// ============================================================================
// TESTS
// ============================================================================
