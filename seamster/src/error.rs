//! Error type shared by every stage of the pattern pipeline.
//!
//! Every variant is a construction-time logic error in the calling pattern
//! definition. Nothing here is transient, so nothing is retried: a stage that
//! hits one of these returns it with `?` and the piece is abandoned.

use thiserror::Error;

/// Errors raised while building, deriving or exporting pattern geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A path or construction referenced a point id that was never defined.
    #[error("point '{0}' is not defined")]
    MissingPoint(String),

    /// A segment did not start where the previous one ended.
    #[error("discontinuous path: expected segment to start at '{expected}', found '{found}'")]
    DiscontinuousPath { expected: String, found: String },

    /// Not enough distinct vertices for the requested operation.
    #[error("degenerate path: {found} distinct vertices, at least {required} required")]
    DegeneratePath { found: usize, required: usize },

    /// A dart's attachment interval intersects one already on the outline.
    #[error(
        "dart interval [{start:.3}, {end:.3}] overlaps existing dart at [{existing_start:.3}, {existing_end:.3}]"
    )]
    OverlappingDart {
        start: f64,
        end: f64,
        existing_start: f64,
        existing_end: f64,
    },

    /// A hem with no width or no fold, or one running into a dart or
    /// another hem.
    #[error("invalid hem: {0}")]
    InvalidHem(String),

    /// An arc-length fraction (or curve parameter) outside `[0, 1]`.
    #[error("position {0} is outside [0, 1]")]
    InvalidPosition(f64),

    /// Two construction lines never meet.
    #[error("lines {first} and {second} are parallel")]
    ParallelLines { first: String, second: String },

    /// A drafter needs measurements the caller did not supply.
    #[error("missing required measurements: {}", .0.join(", "))]
    MissingMeasurement(Vec<String>),

    /// An SVG document or path string could not be turned into a path.
    #[error("SVG import error: {0}")]
    SvgImport(String),

    /// Page size, margin and overlap do not leave a usable printable area.
    #[error("invalid page configuration: {0}")]
    InvalidPageConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = Error::MissingPoint("12".to_string());
        assert_eq!(err.to_string(), "point '12' is not defined");

        let err = Error::MissingMeasurement(vec!["chest".into(), "neck_size".into()]);
        assert_eq!(err.to_string(), "missing required measurements: chest, neck_size");

        let err = Error::InvalidPosition(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
