//! Body measurements.
//!
//! A [`MeasurementSet`] is a plain name → centimetres table plus the fit
//! preference. Drafters check their required fields up front so a missing
//! value is reported once, with every missing name, instead of failing
//! halfway through a draft.

use indexmap::IndexMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSet {
    values: IndexMap<String, f64>,
    ease_fitting: bool,
}

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Looser fit: drafters pick the larger ease values.
    pub fn with_ease_fitting(mut self, ease_fitting: bool) -> Self {
        self.ease_fitting = ease_fitting;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn ease_fitting(&self) -> bool {
        self.ease_fitting
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// A measurement that must be present.
    pub fn value(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| Error::MissingMeasurement(vec![name.to_string()]))
    }

    /// Fail with every name in `fields` that is not present.
    pub fn require(&self, fields: &[&str]) -> Result<()> {
        let missing: Vec<String> = fields
            .iter()
            .filter(|f| !self.values.contains_key(**f))
            .map(|f| f.to_string())
            .collect();
        if missing.is_empty() { Ok(()) } else { Err(Error::MissingMeasurement(missing)) }
    }

    /// `standard` or `fitted` depending on the fit preference.
    pub fn ease(&self, standard: f64, fitted: f64) -> f64 {
        if self.ease_fitting { fitted } else { standard }
    }

    /// `name` plus the ease for the current fit.
    pub fn with_ease(&self, name: &str, standard: f64, fitted: f64) -> Result<f64> {
        Ok(self.value(name)? + self.ease(standard, fitted))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for MeasurementSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect(), ease_fitting: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_lists_every_missing_field() {
        let m = MeasurementSet::new().with("chest", 100.0);
        assert!(m.require(&["chest"]).is_ok());
        assert_eq!(
            m.require(&["chest", "neck_size", "half_back"]),
            Err(Error::MissingMeasurement(vec!["neck_size".into(), "half_back".into()]))
        );
    }

    #[test]
    fn ease_follows_fit_preference() {
        let m = MeasurementSet::new().with("scye_depth", 21.0);
        assert_eq!(m.with_ease("scye_depth", 1.0, 2.5).unwrap(), 22.0);
        let loose = m.with_ease_fitting(true);
        assert_eq!(loose.with_ease("scye_depth", 1.0, 2.5).unwrap(), 23.5);
    }

    #[test]
    fn collect_from_pairs() {
        let m: MeasurementSet = vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)].into_iter().collect();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("b"), Some(2.0));
        assert!(!m.ease_fitting());
    }
}
