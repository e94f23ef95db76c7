//! CLI command implementations.
//!
//! - `draft` - Draft a garment from a measurement file and export it
//! - `outline` - Add seam allowance to closed shapes from an SVG
//! - `preview` - Rasterise a drafted pattern to PNG
//! - `garments` - List garments and the measurements they need

pub mod common;
pub mod draft;
pub mod measurements;
pub mod outline;
pub mod preview;

pub use draft::cmd_draft;
pub use outline::cmd_outline;
pub use preview::cmd_preview;
