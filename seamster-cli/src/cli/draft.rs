//! `seamster draft`: measurement file in, printable pattern out.

use log::info;

use seamster::{Flattener, Garment, Pattern};

use super::common::{export_pieces, flag_value, parse_number, write_output, OutputFormat, PageArgs};
use super::measurements::{print_example, MeasurementFile};

/// Options shared by `draft` and `preview`.
#[derive(Debug, Default)]
pub struct DraftArgs {
    pub input: Option<String>,
    pub garment: Option<Garment>,
    pub ease: bool,
    pub short_sleeve: bool,
    pub waist_dart: bool,
    pub allowance: Option<f64>,
    pub hem: Option<f64>,
    pub tolerance: Option<f64>,
}

impl DraftArgs {
    /// Try to consume the flag (or positional input) at `args[*i]`.
    pub fn parse_flag(&mut self, args: &[String], i: &mut usize) -> Result<bool, String> {
        match args[*i].as_str() {
            "-g" | "--garment" => {
                let name = flag_value(args, i)?;
                let garment = Garment::from_name(name).ok_or_else(|| {
                    let known: Vec<_> = Garment::all().iter().map(|g| g.name()).collect();
                    format!("Unknown garment: {} (available: {})", name, known.join(", "))
                })?;
                self.garment = Some(garment);
            }
            "--ease" => self.ease = true,
            "--short-sleeve" => self.short_sleeve = true,
            "--waist-dart" => self.waist_dart = true,
            "--allowance" => {
                let value = parse_number(args, i)?;
                if value < 0.0 {
                    return Err(format!("--allowance must be zero or positive, got {}", value));
                }
                self.allowance = Some(value);
            }
            "--hem" => {
                let value = parse_number(args, i)?;
                if value < 0.0 {
                    return Err(format!("--hem must be zero or positive, got {}", value));
                }
                self.hem = Some(value);
            }
            "--tolerance" => {
                let value = parse_number(args, i)?;
                if value <= 0.0 {
                    return Err(format!("--tolerance must be positive, got {}", value));
                }
                self.tolerance = Some(value);
            }
            arg if arg == "-" || !arg.starts_with('-') => {
                if self.input.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                self.input = Some(arg.to_string());
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Load the measurement file and draft it. Command-line flags win over
    /// the file.
    pub fn draft(&self) -> Result<Pattern, String> {
        let input = self.input.as_deref().ok_or("No measurement file specified")?;
        let file = MeasurementFile::load(input)?;

        let garment = match self.garment {
            Some(g) => g,
            None => file
                .garment()?
                .ok_or("No garment given: use -g or set `garment:` in the measurement file")?,
        };

        let measurements = file.measurement_set().with_ease_fitting(file.ease_fitting || self.ease);
        let mut options = file
            .draft_options()
            .with_short_sleeve(file.short_sleeve || self.short_sleeve)
            .with_waist_dart(file.waist_dart || self.waist_dart);
        if let Some(allowance) = self.allowance {
            options = options.with_seam_allowance(allowance);
        }
        if let Some(hem) = self.hem {
            options = options.with_hem_width(hem);
        }
        if let Some(tolerance) = self.tolerance {
            options = options.with_flattener(Flattener::default().with_tolerance(tolerance));
        }

        info!("Drafting {} for {} ({} measurements)", garment.name(), file.name, measurements.len());
        let mut pattern = garment.draft(&measurements, &options).map_err(|e| e.to_string())?;
        pattern.name = format!("{} ({})", file.name, pattern.name);
        for piece in &pattern.pieces {
            info!("  {:<8} {:>8.1} cm² {:>3} darts {:>3} notches", piece.name, piece.area(), piece.darts.len(), piece.notches.len());
        }
        Ok(pattern)
    }
}

pub fn cmd_draft(args: &[String]) -> Result<(), String> {
    let mut draft = DraftArgs::default();
    let mut page = PageArgs::default();
    let mut output_path = "-".to_string();
    let mut format: Option<OutputFormat> = None;
    let mut example = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => output_path = flag_value(args, &mut i)?.to_string(),
            "-f" | "--format" => {
                let name = flag_value(args, &mut i)?;
                format = Some(
                    OutputFormat::from_name(name)
                        .ok_or_else(|| format!("Unknown format: {} (use svg, pdf or json)", name))?,
                );
            }
            "--example" => example = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            _ => {
                if !draft.parse_flag(args, &mut i)? && !page.parse_flag(args, &mut i)? {
                    return Err(format!("Unknown option: {}", args[i]));
                }
            }
        }
        i += 1;
    }

    if example {
        return print_example(draft.garment.unwrap_or(Garment::TShirt));
    }

    let format = format
        .or_else(|| OutputFormat::from_path(&output_path))
        .unwrap_or(OutputFormat::Svg);
    let pattern = draft.draft()?;
    let measurements = pattern.measurements.iter().map(|(k, v)| (k.to_string(), v)).collect();
    let bytes = export_pieces(&pattern.name, measurements, &pattern.pieces, format, &page)?;
    write_output(&output_path, &bytes)
}

fn print_usage() {
    eprintln!("Usage: seamster draft <measurements.yaml> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -g, --garment <name>   Garment to draft: tshirt, trousers (default: from file)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!("  -f, --format <fmt>     svg, pdf or json (default: from extension, else svg)");
    eprintln!("  --ease                 Looser fit");
    eprintln!("  --short-sleeve         T-shirt: short sleeve");
    eprintln!("  --waist-dart           Trousers: front waist dart");
    eprintln!("  --allowance <cm>       Seam allowance (default: from file, else 1.0)");
    eprintln!("  --hem <cm>             Hem turn-up, 0 for none (default: from file, else 0)");
    eprintln!("  --tolerance <cm>       Curve flattening tolerance (default: 0.1)");
    eprintln!("  --page <size>          a4, letter or fit (default: a4)");
    eprintln!("  --landscape            Rotate the page");
    eprintln!("  --margin <cm>          Page margin (default: 1.0)");
    eprintln!("  --overlap <cm>         Tile overlap (default: 1.5)");
    eprintln!("  --no-compress          PDF: leave content streams uncompressed");
    eprintln!("  --example              Print an example measurement file");
}
