//! Measurement files.
//!
//! A measurement file is YAML: a name, an optional garment, style flags and
//! a map of body measurements in centimetres.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use seamster::drafts::samples;
use seamster::{DraftOptions, Garment, MeasurementSet};

/// A person's measurements plus the drafting choices that go with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementFile {
    #[serde(default = "default_name")]
    pub name: String,

    /// Garment to draft; `-g` on the command line wins.
    #[serde(default)]
    pub garment: Option<String>,

    /// Looser fit (larger ease values).
    #[serde(default)]
    pub ease_fitting: bool,

    #[serde(default)]
    pub short_sleeve: bool,

    #[serde(default)]
    pub waist_dart: bool,

    /// Seam allowance in cm.
    #[serde(default = "default_seam_allowance")]
    pub seam_allowance: f64,

    /// Hem turn-up in cm; 0 leaves hems raw.
    #[serde(default)]
    pub hem_width: f64,

    pub measurements: BTreeMap<String, f64>,
}

fn default_name() -> String {
    "pattern".to_string()
}

fn default_seam_allowance() -> f64 {
    1.0
}

impl MeasurementFile {
    /// Load a measurement file from disk (`-` reads stdin).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = if path == Path::new("-") {
            super::common::read_input("-")?
        } else {
            fs::read_to_string(path).map_err(|e| format!("Failed to read measurement file: {}", e))?
        };
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let file: MeasurementFile =
            serde_yaml::from_str(content).map_err(|e| format!("Failed to parse measurement YAML: {}", e))?;
        if let Some((name, value)) = file.measurements.iter().find(|(_, v)| !v.is_finite() || **v <= 0.0) {
            return Err(format!("Measurement {} must be a positive number, got {}", name, value));
        }
        if !file.seam_allowance.is_finite() || file.seam_allowance < 0.0 {
            return Err(format!("seam_allowance must be zero or positive, got {}", file.seam_allowance));
        }
        if !file.hem_width.is_finite() || file.hem_width < 0.0 {
            return Err(format!("hem_width must be zero or positive, got {}", file.hem_width));
        }
        Ok(file)
    }

    /// The garment named in the file, if any.
    pub fn garment(&self) -> Result<Option<Garment>, String> {
        match &self.garment {
            None => Ok(None),
            Some(name) => Garment::from_name(name)
                .map(Some)
                .ok_or_else(|| format!("Unknown garment in measurement file: {}", name)),
        }
    }

    pub fn measurement_set(&self) -> MeasurementSet {
        let mut set = MeasurementSet::new().with_ease_fitting(self.ease_fitting);
        for (name, value) in &self.measurements {
            set.insert(name.clone(), *value);
        }
        set
    }

    pub fn draft_options(&self) -> DraftOptions {
        DraftOptions::default()
            .with_short_sleeve(self.short_sleeve)
            .with_waist_dart(self.waist_dart)
            .with_seam_allowance(self.seam_allowance)
            .with_hem_width(self.hem_width)
    }

    /// A filled-in file for `garment`, built from the library's samples.
    pub fn example(garment: Garment) -> Self {
        let sample = match garment {
            Garment::TShirt => samples::tshirt(),
            Garment::Trousers => samples::trousers(),
        };
        let name = match garment {
            Garment::TShirt => "Medium tee",
            Garment::Trousers => "Medium trousers",
        };
        Self {
            name: name.to_string(),
            garment: Some(garment.name().to_string()),
            ease_fitting: false,
            short_sleeve: false,
            waist_dart: garment == Garment::Trousers,
            seam_allowance: 1.0,
            hem_width: 2.0,
            measurements: sample.iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Print an example measurement file to stdout.
pub fn print_example(garment: Garment) -> Result<(), String> {
    let yaml = serde_yaml::to_string(&MeasurementFile::example(garment))
        .map_err(|e| format!("Failed to write example YAML: {}", e))?;
    println!("# seamster measurement file ({})", garment.description());
    println!("# All lengths in centimetres.");
    print!("{}", yaml);
    Ok(())
}
