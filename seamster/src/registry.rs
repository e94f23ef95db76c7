//! Named construction points.
//!
//! A draft is a list of points placed relative to each other ("point 8 is a
//! quarter of the rise below point 3..."). The registry holds them by id so
//! the path builder can refer to them by name. It is scoped to one piece and
//! can be dropped as soon as the piece's paths are built.

use indexmap::IndexMap;
use log::trace;

use crate::error::{Error, Result};
use crate::geometry::{line_intersection, Point};

/// Point id → coordinate table, kept in definition order.
///
/// ## Rust Lesson #9: IndexMap vs HashMap
///
/// A `HashMap` forgets insertion order. The label table and the JSON output
/// list points in the order the drafter defined them, so we use
/// `indexmap::IndexMap`, which has the same API but iterates in order.
#[derive(Debug, Clone, Default)]
pub struct PointRegistry {
    points: IndexMap<String, Point>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) a named coordinate.
    ///
    /// Redefinition only affects paths built afterwards: the builder copies
    /// coordinates when a segment is appended.
    pub fn define(&mut self, id: impl Into<String>, x: f64, y: f64) -> Point {
        let id = id.into();
        let p = Point::new(x, y);
        trace!("define {} = ({:.3}, {:.3})", id, x, y);
        self.points.insert(id, p);
        p
    }

    /// Look up a point by id.
    pub fn resolve(&self, id: &str) -> Result<Point> {
        self.points
            .get(id)
            .copied()
            .ok_or_else(|| Error::MissingPoint(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.points.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `base + (dx, dy)`.
    pub fn define_relative(&mut self, id: impl Into<String>, base: &str, dx: f64, dy: f64) -> Result<Point> {
        let b = self.resolve(base)?;
        Ok(self.define(id, b.x + dx, b.y + dy))
    }

    /// A point `distance` away from `base` at `angle_degrees`.
    ///
    /// Angles are measured from +x towards +y, so in y-down pattern space
    /// 90° points down the page.
    pub fn define_polar(
        &mut self,
        id: impl Into<String>,
        base: &str,
        distance: f64,
        angle_degrees: f64,
    ) -> Result<Point> {
        let b = self.resolve(base)?;
        let a = angle_degrees.to_radians();
        Ok(self.define(id, b.x + distance * a.cos(), b.y + distance * a.sin()))
    }

    /// The point at `fraction` of the way from `a` to `b`. Fractions outside
    /// `[0, 1]` extend the line.
    pub fn define_on_line(&mut self, id: impl Into<String>, a: &str, b: &str, fraction: f64) -> Result<Point> {
        let pa = self.resolve(a)?;
        let pb = self.resolve(b)?;
        let p = pa.lerp(pb, fraction);
        Ok(self.define(id, p.x, p.y))
    }

    /// Square off the line `line_start`-`line_end` at `from`, `distance` to
    /// the left of the line direction (`(-dy, dx)`). Negative distances go
    /// to the right.
    pub fn define_perpendicular(
        &mut self,
        id: impl Into<String>,
        line_start: &str,
        line_end: &str,
        from: &str,
        distance: f64,
    ) -> Result<Point> {
        let s = self.resolve(line_start)?;
        let e = self.resolve(line_end)?;
        let f = self.resolve(from)?;
        let dir = (e - s).normalized().ok_or(Error::DegeneratePath { found: 1, required: 2 })?;
        let p = f + dir.perp() * distance;
        Ok(self.define(id, p.x, p.y))
    }

    /// Where the (infinite) lines `a1`-`a2` and `b1`-`b2` cross.
    pub fn define_intersection(
        &mut self,
        id: impl Into<String>,
        a1: &str,
        a2: &str,
        b1: &str,
        b2: &str,
    ) -> Result<Point> {
        let (pa1, pa2) = (self.resolve(a1)?, self.resolve(a2)?);
        let (pb1, pb2) = (self.resolve(b1)?, self.resolve(b2)?);
        let p = line_intersection(pa1, pa2, pb1, pb2).ok_or_else(|| Error::ParallelLines {
            first: format!("{}-{}", a1, a2),
            second: format!("{}-{}", b1, b2),
        })?;
        Ok(self.define(id, p.x, p.y))
    }

    /// Reflect `source` across the vertical line `x = mirror_x`.
    pub fn define_reflected(&mut self, id: impl Into<String>, source: &str, mirror_x: f64) -> Result<Point> {
        let s = self.resolve(source)?;
        Ok(self.define(id, 2.0 * mirror_x - s.x, s.y))
    }

    /// Every point in definition order, for labels and coordinate tables.
    pub fn snapshot(&self) -> Vec<(String, Point)> {
        self.points.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.points.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
