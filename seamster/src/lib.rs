//! # seamster
//!
//! Geometry engine for sewing-pattern pieces.
//!
//! Named points feed paths, paths are flattened to polylines, and every
//! later stage (seam allowance, darts, notches, hems) works on those polylines.
//! Assembled pieces are laid out on printable pages and written as SVG or
//! PDF.
//!
//! ```text
//!   PointRegistry ─► PathBuilder ─► Path ─► Flattener ─► Polyline
//!                                                          │
//!            offset / dart / notch / hem ◄─────────────────┘
//!                          │
//!                    PieceBuilder ─► PatternPiece ─► export::layout ─► SVG / PDF
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level, so callers can write
//!   `seamster::Bar` without knowing which file it lives in

pub mod clip;
pub mod dart;
pub mod drafts;
pub mod error;
pub mod export;
pub mod flatten;
pub mod geometry;
pub mod hem;
pub mod measurements;
pub mod notch;
pub mod offset;
pub mod path;
pub mod pattern;
pub mod piece;
pub mod polyline;
pub mod registry;
pub mod svg;

// Re-export common types at crate root for convenience.
pub use dart::{insert_dart, Dart, DartedOutline, PathPosition};
pub use drafts::{DraftOptions, Garment};
pub use error::{Error, Result};
pub use export::{layout, render_pdf, render_svg, ExportArtifact, PageConfig, PdfOptions};
pub use flatten::Flattener;
pub use geometry::{BoundingBox, Line, Point};
pub use hem::{apply_hems, place_hem, Hem};
pub use measurements::MeasurementSet;
pub use notch::{place_notch, Notch, NotchStyle};
pub use offset::{offset_path, offset_polyline, OffsetOptions};
pub use path::{Anchor, Path, PathBuilder, Segment};
pub use pattern::Pattern;
pub use piece::{PatternPiece, PieceBuilder};
pub use polyline::Polyline;
pub use registry::PointRegistry;
pub use svg::import_outlines;
