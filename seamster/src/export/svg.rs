//! SVG serializer for an [`ExportArtifact`].
//!
//! Produces one document. Units are centimetres (`width="..cm"` with a
//! matching viewBox), so the file prints at true scale. Every page is drawn
//! as a framed sheet; the sheets of one piece keep their tile grid and pieces
//! are stacked top to bottom.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::{ExportArtifact, Page, PageItem, StrokeKind};
use crate::geometry::Point;

/// Gap between sheets, in cm.
const SHEET_GAP: f64 = 1.0;

fn hex(kind: StrokeKind) -> String {
    let (r, g, b) = kind.colour();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sheet offsets: `(page index, x, y)` for every page, plus document size.
fn arrange(artifact: &ExportArtifact) -> (Vec<(usize, f64, f64)>, f64, f64) {
    let mut placed = Vec::with_capacity(artifact.pages.len());
    let (mut width, mut top) = (0.0_f64, 0.0_f64);
    let mut start = 0;

    while start < artifact.pages.len() {
        let piece = &artifact.pages[start].piece;
        let end = artifact.pages[start..]
            .iter()
            .position(|p| &p.piece != piece)
            .map_or(artifact.pages.len(), |n| start + n);
        let group = &artifact.pages[start..end];

        let mut bottom = top;
        for (offset, page) in group.iter().enumerate() {
            let x = page.column as f64 * (page.width + SHEET_GAP);
            let y = top + page.row as f64 * (page.height + SHEET_GAP);
            placed.push((start + offset, x, y));
            width = width.max(x + page.width);
            bottom = bottom.max(y + page.height);
        }
        top = bottom + SHEET_GAP;
        start = end;
    }

    let height = (top - SHEET_GAP).max(0.0);
    (placed, width, height)
}

fn write_page(svg: &mut String, page: &Page, x: f64, y: f64) {
    let label = page.label();
    let _ = writeln!(
        svg,
        r##"<g id="{}" transform="translate({:.2},{:.2})">
  <rect x="0" y="0" width="{:.2}" height="{:.2}" fill="none" stroke="#cccccc" stroke-width="0.02"/>"##,
        escape(label.replace(' ', "-").as_str()),
        x,
        y,
        page.width,
        page.height
    );

    for item in &page.items {
        match item {
            PageItem::Stroke { kind, points, closed } => {
                if points.len() < 2 {
                    continue;
                }
                let element = if *closed { "polygon" } else { "polyline" };
                let dash = if kind.is_dashed() { r#" stroke-dasharray="0.30 0.15""# } else { "" };
                let _ = writeln!(
                    svg,
                    r#"  <{} class="{}" points="{}" fill="none" stroke="{}" stroke-width="{:.2}"{}/>"#,
                    element,
                    kind.name(),
                    points_attr(points),
                    hex(*kind),
                    kind.width(),
                    dash
                );
            }
            PageItem::Label { text, at, size } => {
                let _ = writeln!(
                    svg,
                    r#"  <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}">{}</text>"#,
                    at.x,
                    at.y,
                    size,
                    escape(text.as_str())
                );
            }
        }
    }
    svg.push_str("</g>\n");
}

/// Serialize the artifact as a single SVG document.
pub fn render_svg(artifact: &ExportArtifact) -> String {
    let (placed, width, height) = arrange(artifact);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w:.2}cm" height="{h:.2}cm"
     viewBox="0 0 {w:.2} {h:.2}">
  <title>seamster pattern ({n} pages)</title>
<rect width="100%" height="100%" fill="white"/>
"#,
        w = width,
        h = height,
        n = artifact.page_count()
    );

    for (index, x, y) in placed {
        write_page(&mut svg, &artifact.pages[index], x, y);
    }

    svg.push_str("</svg>\n");
    svg
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::rect_piece;
    use crate::export::{layout, PageConfig};

    #[test]
    fn single_page_parses() {
        let artifact = layout(&[rect_piece("Pocket", 10.0, 10.0)], &PageConfig::default()).unwrap();
        let svg = render_svg(&artifact);

        assert!(svg.contains(r#"width="21.00cm""#));
        assert!(svg.contains("Pocket R1C1"));
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }

    #[test]
    fn tiled_pages_form_a_grid() {
        let page = PageConfig::default();
        let artifact = layout(&[rect_piece("Panel", 40.0, 10.0), rect_piece("Cuff", 5.0, 5.0)], &page).unwrap();
        let (placed, width, height) = arrange(&artifact);

        assert_eq!(placed.len(), 4);
        // Panel: three sheets side by side; Cuff below them.
        assert!((width - (3.0 * page.width + 2.0 * SHEET_GAP)).abs() < 1e-9);
        assert!((height - (2.0 * page.height + SHEET_GAP)).abs() < 1e-9);
        assert_eq!(placed[3].1, 0.0);
        assert!((placed[3].2 - (page.height + SHEET_GAP)).abs() < 1e-9);

        let svg = render_svg(&artifact);
        assert!(svg.contains("stroke-dasharray"));
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }

    #[test]
    fn names_are_escaped() {
        let artifact = layout(&[rect_piece("Front & <Back>", 10.0, 10.0)], &PageConfig::default()).unwrap();
        let svg = render_svg(&artifact);
        assert!(svg.contains("Front &amp; &lt;Back&gt;"));
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }
}
