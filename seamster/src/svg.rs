//! SVG import - turn existing outlines into [`Path`]s.
//!
//! Two entry points:
//! - [`import_outlines`] takes a whole document. usvg resolves CSS,
//!   transforms and basic shapes (`rect`, `circle`, `polygon`...) first, then
//!   we walk the tree and convert every path.
//! - [`Path::from_svg_data`] takes a bare `d="..."` string and parses it with
//!   svgtypes, which already makes every command absolute.
//!
//! Curves are kept as cubic segments (quadratics are degree-elevated), so the
//! imported path flattens and offsets exactly like a drafted one. Units are
//! taken as centimetres.

use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, EPSILON};
use crate::path::{elevate, Anchor, Path, Segment};

/// Collects segments per subpath while a path's commands stream in.
#[derive(Debug, Default)]
struct SubpathCollector {
    paths: Vec<Path>,
    segments: Vec<Segment>,
    start: Option<Point>,
    current: Option<Point>,
}

impl SubpathCollector {
    fn move_to(&mut self, p: Point) -> Result<()> {
        self.flush(false)?;
        self.start = Some(p);
        self.current = Some(p);
        Ok(())
    }

    /// Current point, or an error for drawing commands with nowhere to start.
    fn pen(&mut self) -> Result<Point> {
        let p = self.current.ok_or_else(|| Error::SvgImport("path data must begin with a move".into()))?;
        if self.start.is_none() {
            self.start = Some(p);
        }
        Ok(p)
    }

    fn line_to(&mut self, p: Point) -> Result<()> {
        let from = self.pen()?;
        if !from.approx_eq(p, EPSILON) {
            self.segments.push(Segment::Line { from: Anchor::at(from), to: Anchor::at(p) });
        }
        self.current = Some(p);
        Ok(())
    }

    fn quad_to(&mut self, ctrl: Point, p: Point) -> Result<()> {
        let from = self.pen()?;
        let (ctrl1, ctrl2) = elevate(from, ctrl, p);
        self.cubic_to(ctrl1, ctrl2, p)
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, p: Point) -> Result<()> {
        let from = self.pen()?;
        self.segments.push(Segment::Curve { from: Anchor::at(from), ctrl1, ctrl2, to: Anchor::at(p) });
        self.current = Some(p);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(start) = self.start {
            self.line_to(start)?;
            self.flush(true)?;
            // Drawing after a close continues from the subpath start.
            self.current = Some(start);
        }
        Ok(())
    }

    fn flush(&mut self, closed: bool) -> Result<()> {
        self.start = None;
        if self.segments.is_empty() {
            return Ok(());
        }
        let segments = std::mem::take(&mut self.segments);
        self.paths.push(Path::from_segments(segments, closed)?);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Path>> {
        self.flush(false)?;
        Ok(self.paths)
    }
}

// ============================================================================
// PATH DATA (svgtypes)
// ============================================================================

/// Parse every subpath of an SVG `d` attribute.
pub fn paths_from_svg_data(data: &str) -> Result<Vec<Path>> {
    use svgtypes::SimplePathSegment as S;

    let mut collector = SubpathCollector::default();
    for segment in svgtypes::SimplifyingPathParser::from(data) {
        let segment = segment.map_err(|e| Error::SvgImport(e.to_string()))?;
        match segment {
            S::MoveTo { x, y } => collector.move_to(Point::new(x, y))?,
            S::LineTo { x, y } => collector.line_to(Point::new(x, y))?,
            S::Quadratic { x1, y1, x, y } => collector.quad_to(Point::new(x1, y1), Point::new(x, y))?,
            S::CurveTo { x1, y1, x2, y2, x, y } => {
                collector.cubic_to(Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y))?
            }
            S::ClosePath => collector.close()?,
        }
    }
    collector.finish()
}

impl Path {
    /// The first subpath of an SVG `d` attribute.
    pub fn from_svg_data(data: &str) -> Result<Path> {
        paths_from_svg_data(data)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::SvgImport("path data has no segments".into()))
    }
}

// ============================================================================
// DOCUMENTS (usvg)
// ============================================================================

/// Extract every outline in an SVG document, in document order.
///
/// Each subpath becomes its own [`Path`]. Element transforms are applied.
pub fn import_outlines(svg_content: &str) -> Result<Vec<Path>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options).map_err(|e| Error::SvgImport(e.to_string()))?;

    let mut paths = Vec::new();
    import_group(tree.root(), &mut paths)?;

    if paths.is_empty() {
        return Err(Error::SvgImport("no paths found in document".into()));
    }
    debug!("imported {} outlines from SVG", paths.len());
    Ok(paths)
}

fn import_group(group: &usvg::Group, paths: &mut Vec<Path>) -> Result<()> {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => import_group(g, paths)?,
            usvg::Node::Path(p) => paths.extend(import_path(p)?),
            // Text and images carry no outline.
            _ => {}
        }
    }
    Ok(())
}

fn import_path(path: &usvg::Path) -> Result<Vec<Path>> {
    use usvg::tiny_skia_path::PathSegment;

    let to_point = |p: usvg::tiny_skia_path::Point| Point::new(p.x as f64, p.y as f64);
    let data = path
        .data()
        .clone()
        .transform(path.abs_transform())
        .ok_or_else(|| Error::SvgImport(format!("path '{}' collapses under its transform", path.id())))?;

    let mut collector = SubpathCollector::default();
    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => collector.move_to(to_point(p))?,
            PathSegment::LineTo(p) => collector.line_to(to_point(p))?,
            PathSegment::QuadTo(ctrl, p) => collector.quad_to(to_point(ctrl), to_point(p))?,
            PathSegment::CubicTo(c1, c2, p) => collector.cubic_to(to_point(c1), to_point(c2), to_point(p))?,
            PathSegment::Close => collector.close()?,
        }
    }
    collector.finish()
}

// ============================================================================
// TESTS
// ============================================================================
