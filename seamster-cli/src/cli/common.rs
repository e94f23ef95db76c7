//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Read as IoRead, Write as IoWrite};

use log::info;
use serde::Serialize;

use seamster::{
    layout, render_pdf, render_svg, BoundingBox, Line, PageConfig, PatternPiece, PdfOptions, Point,
};

/// Output format for exported pieces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    Svg,
    Pdf,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        match name.to_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "pdf" => Some(OutputFormat::Pdf),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Guess from an output file extension.
    pub fn from_path(path: &str) -> Option<OutputFormat> {
        let ext = std::path::Path::new(path).extension()?.to_str()?;
        OutputFormat::from_name(ext)
    }
}

/// Paper choice from `--page`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageSize {
    A4,
    Letter,
    /// One untiled sheet sized to the pattern.
    Fit,
}

impl PageSize {
    pub fn from_name(name: &str) -> Option<PageSize> {
        match name.to_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            "fit" => Some(PageSize::Fit),
            _ => None,
        }
    }
}

/// Page flags shared by every exporting command.
#[derive(Clone, Debug)]
pub struct PageArgs {
    pub size: PageSize,
    pub landscape: bool,
    pub margin: Option<f64>,
    pub overlap: Option<f64>,
    pub compress: bool,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self { size: PageSize::A4, landscape: false, margin: None, overlap: None, compress: true }
    }
}

impl PageArgs {
    /// Try to consume the flag at `args[*i]`. Returns `Ok(false)` if it is
    /// not a page flag.
    pub fn parse_flag(&mut self, args: &[String], i: &mut usize) -> Result<bool, String> {
        match args[*i].as_str() {
            "--page" => {
                let value = flag_value(args, i)?;
                self.size = PageSize::from_name(value)
                    .ok_or_else(|| format!("Unknown page size: {} (use a4, letter or fit)", value))?;
            }
            "--landscape" => self.landscape = true,
            "--margin" => self.margin = Some(parse_number(args, i)?),
            "--overlap" => self.overlap = Some(parse_number(args, i)?),
            "--no-compress" => self.compress = false,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Resolve against the pieces being exported; `fit` needs their extent.
    pub fn page_config(&self, pieces: &[PatternPiece]) -> Result<PageConfig, String> {
        let mut page = match self.size {
            PageSize::A4 => PageConfig::default(),
            PageSize::Letter => PageConfig::letter(),
            PageSize::Fit => {
                let bbox = pieces
                    .iter()
                    .map(|p| p.bounding_box)
                    .reduce(|a, b| a.union(&b))
                    .ok_or("Nothing to export")?;
                PageConfig::fit(&bbox, self.margin.unwrap_or(1.0))
            }
        };
        if self.landscape {
            page = page.landscape();
        }
        if let Some(margin) = self.margin {
            if self.size != PageSize::Fit {
                page = page.with_margin(margin);
            }
        }
        if let Some(overlap) = self.overlap {
            page = page.with_overlap(overlap);
        }
        Ok(page)
    }
}

/// Value following a flag, advancing the cursor.
pub fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i).map(String::as_str).ok_or_else(|| format!("{} requires a value", flag))
}

pub fn parse_number(args: &[String], i: &mut usize) -> Result<f64, String> {
    let flag = args[*i].clone();
    let value = flag_value(args, i)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid number for {}: {}", flag, value))
}

/// Read a file, or stdin for `-`.
pub fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(content)
    } else {
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))
    }
}

/// Write to a file, or stdout for `-`.
pub fn write_output(path: &str, bytes: &[u8]) -> Result<(), String> {
    if path == "-" {
        let mut out = io::stdout().lock();
        out.write_all(bytes)
            .and_then(|_| out.flush())
            .map_err(|e| format!("Failed to write stdout: {}", e))
    } else {
        fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path, e))?;
        info!("Wrote {} ({} bytes)", path, bytes.len());
        Ok(())
    }
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

#[derive(Serialize)]
pub struct JsonDart {
    pub leg_a: [f64; 2],
    pub apex: [f64; 2],
    pub leg_b: [f64; 2],
    pub intake: f64,
}

#[derive(Serialize)]
pub struct JsonHem {
    pub width: f64,
    pub fold: Vec<[f64; 2]>,
}

#[derive(Serialize)]
pub struct JsonLabel {
    pub name: String,
    pub at: [f64; 2],
}

#[derive(Serialize)]
pub struct JsonPiece {
    pub name: String,
    pub area: f64,
    pub perimeter: f64,
    /// `[min_x, min_y, max_x, max_y]`, allowance included.
    pub bounding_box: [f64; 4],
    pub cut_line: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_allowance: Option<Vec<[f64; 2]>>,
    pub darts: Vec<JsonDart>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hems: Vec<JsonHem>,
    pub notches: Vec<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold_line: Option<[f64; 4]>,
    pub labels: Vec<JsonLabel>,
}

#[derive(Serialize)]
pub struct JsonOutput {
    pub name: String,
    pub units: &'static str,
    pub measurements: Vec<(String, f64)>,
    pub pieces: Vec<JsonPiece>,
}

fn xy(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

fn line(l: &Line) -> [f64; 4] {
    [l.x1, l.y1, l.x2, l.y2]
}

fn bbox(b: &BoundingBox) -> [f64; 4] {
    [b.min_x, b.min_y, b.max_x, b.max_y]
}

impl JsonPiece {
    pub fn from_piece(piece: &PatternPiece) -> Self {
        Self {
            name: piece.name.clone(),
            area: piece.area(),
            perimeter: piece.perimeter(),
            bounding_box: bbox(&piece.bounding_box),
            cut_line: piece.cut_polyline().points().iter().copied().map(xy).collect(),
            seam_allowance: piece
                .allowance_polyline()
                .map(|p| p.points().iter().copied().map(xy).collect()),
            darts: piece
                .darts
                .iter()
                .map(|d| JsonDart { leg_a: xy(d.leg_a), apex: xy(d.apex), leg_b: xy(d.leg_b), intake: d.intake() })
                .collect(),
            hems: piece
                .hems
                .iter()
                .map(|h| JsonHem { width: h.width, fold: h.fold.iter().copied().map(xy).collect() })
                .collect(),
            notches: piece.notches.iter().map(|n| line(&n.tick())).collect(),
            fold_line: piece.fold_line.as_ref().map(line),
            labels: piece
                .labels
                .iter()
                .map(|(name, at)| JsonLabel { name: name.clone(), at: xy(*at) })
                .collect(),
        }
    }
}

// ============================================================================
// EXPORT
// ============================================================================

/// Render `pieces` in `format`, returning the bytes to write.
pub fn export_pieces(
    name: &str,
    measurements: Vec<(String, f64)>,
    pieces: &[PatternPiece],
    format: OutputFormat,
    page_args: &PageArgs,
) -> Result<Vec<u8>, String> {
    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                name: name.to_string(),
                units: "cm",
                measurements,
                pieces: pieces.iter().map(JsonPiece::from_piece).collect(),
            };
            let mut json = serde_json::to_string_pretty(&output)
                .map_err(|e| format!("Failed to serialize JSON: {}", e))?;
            json.push('\n');
            Ok(json.into_bytes())
        }
        OutputFormat::Svg | OutputFormat::Pdf => {
            let page = page_args.page_config(pieces)?;
            let artifact = layout(pieces, &page).map_err(|e| e.to_string())?;
            info!(
                "{} pages of {:.2} x {:.2} cm",
                artifact.page_count(),
                page.width,
                page.height
            );
            if format == OutputFormat::Svg {
                Ok(render_svg(&artifact).into_bytes())
            } else {
                let options = PdfOptions::default().with_compress(page_args.compress);
                Ok(render_pdf(&artifact, &options))
            }
        }
    }
}
