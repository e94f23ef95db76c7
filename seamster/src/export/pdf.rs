//! Minimal PDF writer for an [`ExportArtifact`].
//!
//! One PDF page per artifact page, at true size. Only what a pattern needs is
//! emitted: stroked polylines, dash patterns, RGB colours and Helvetica text.
//! Page coordinates are y-down centimetres; [`Transform::pdf`] maps them to
//! y-up points.
//!
//! ```text
//!   1 Catalog ─► 2 Pages ─► 4 Page ─► 5 content stream
//!                       └─► 6 Page ─► 7 content stream ...
//!   3 Font (Helvetica, shared)
//! ```

use std::fmt::Write as _;

use log::debug;

use super::{ExportArtifact, Page, PageItem, Transform, POINTS_PER_CM};

/// Serializer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    /// Deflate content streams.
    pub compress: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl PdfOptions {
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

const FIRST_PAGE_OBJECT: usize = 4;

/// Byte buffer that remembers where each object starts, for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        // Binary marker comment so transfer tools keep the file as binary.
        buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self { buf, offsets: Vec::new() }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.begin(id);
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, data: &[u8], compressed: bool) {
        self.begin(id);
        let filter = if compressed { " /Filter /FlateDecode" } else { "" };
        self.buf.extend_from_slice(format!("<< /Length {}{} >>\nstream\n", data.len(), filter).as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn begin(&mut self, id: usize) {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.buf.len();
        self.buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref = self.buf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = writeln!(tail, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref
        );
        self.buf.extend_from_slice(tail.as_bytes());
        self.buf
    }
}

/// Escape a string for a PDF literal; non-ASCII falls back to `?`.
fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(page: &Page) -> String {
    let t = Transform::pdf(page.height);
    let mut ops = String::new();
    ops.push_str("1 J 1 j\n");

    for item in &page.items {
        match item {
            PageItem::Stroke { kind, points, closed } => {
                let Some((first, rest)) = points.split_first() else { continue };
                if rest.is_empty() {
                    continue;
                }
                let (r, g, b) = kind.colour();
                let _ = writeln!(
                    ops,
                    "{:.3} {:.3} {:.3} RG {:.2} w",
                    r as f64 / 255.0,
                    g as f64 / 255.0,
                    b as f64 / 255.0,
                    kind.width() * POINTS_PER_CM
                );
                if kind.is_dashed() {
                    let _ = writeln!(ops, "[{:.2} {:.2}] 0 d", 0.3 * POINTS_PER_CM, 0.15 * POINTS_PER_CM);
                } else {
                    ops.push_str("[] 0 d\n");
                }
                let p = t.apply(*first);
                let _ = writeln!(ops, "{:.2} {:.2} m", p.x, p.y);
                for q in rest {
                    let q = t.apply(*q);
                    let _ = writeln!(ops, "{:.2} {:.2} l", q.x, q.y);
                }
                ops.push_str(if *closed { "s\n" } else { "S\n" });
            }
            PageItem::Label { text, at, size } => {
                let p = t.apply(*at);
                let _ = writeln!(
                    ops,
                    "0 0 0 rg BT /F1 {:.2} Tf {:.2} {:.2} Td ({}) Tj ET",
                    size * POINTS_PER_CM,
                    p.x,
                    p.y,
                    pdf_text(text)
                );
            }
        }
    }
    ops
}

/// Serialize the artifact as a PDF document.
pub fn render_pdf(artifact: &ExportArtifact, options: &PdfOptions) -> Vec<u8> {
    let mut pdf = PdfWriter::new();
    let page_ids: Vec<usize> = (0..artifact.pages.len()).map(|i| FIRST_PAGE_OBJECT + 2 * i).collect();

    pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    let kids = page_ids.iter().map(|id| format!("{} 0 R", id)).collect::<Vec<_>>().join(" ");
    pdf.object(2, &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()));
    pdf.object(3, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");

    for (page, &id) in artifact.pages.iter().zip(&page_ids) {
        pdf.object(
            id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page.width * POINTS_PER_CM,
                page.height * POINTS_PER_CM,
                id + 1
            ),
        );
        let ops = content_stream(page);
        if options.compress {
            let data = miniz_oxide::deflate::compress_to_vec_zlib(ops.as_bytes(), 6);
            pdf.stream(id + 1, &data, true);
        } else {
            pdf.stream(id + 1, ops.as_bytes(), false);
        }
    }

    let bytes = pdf.finish();
    debug!("wrote {} PDF pages ({} bytes)", artifact.page_count(), bytes.len());
    bytes
}

// ============================================================================
// TESTS
// ============================================================================
