//! `seamster outline`: add seam allowance to shapes drawn elsewhere.
//!
//! Every closed path in the SVG becomes one piece. Open paths are skipped
//! with a warning since they cannot carry an allowance.

use log::{info, warn};

use seamster::{import_outlines, PatternPiece, PieceBuilder};

use super::common::{export_pieces, flag_value, parse_number, read_input, write_output, OutputFormat, PageArgs};

/// Build pieces from the closed outlines in `svg`.
pub fn pieces_from_svg(svg: &str, allowance: f64) -> Result<Vec<PatternPiece>, String> {
    let outlines = import_outlines(svg).map_err(|e| e.to_string())?;
    let mut pieces = Vec::new();
    for (index, outline) in outlines.into_iter().enumerate() {
        if !outline.is_closed() {
            warn!("Skipping open path #{}", index + 1);
            continue;
        }
        let name = format!("Piece {}", pieces.len() + 1);
        let piece = PieceBuilder::new(name, outline)
            .seam_allowance(allowance)
            .assemble()
            .map_err(|e| format!("Path #{}: {}", index + 1, e))?;
        pieces.push(piece);
    }
    if pieces.is_empty() {
        return Err("No closed outlines found".to_string());
    }
    info!("Imported {} outlines", pieces.len());
    Ok(pieces)
}

pub fn cmd_outline(args: &[String]) -> Result<(), String> {
    let mut svg_path: Option<&str> = None;
    let mut output_path = "-".to_string();
    let mut format: Option<OutputFormat> = None;
    let mut allowance = 1.0;
    let mut page = PageArgs::default();

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
            "-a" | "--allowance" => {
                allowance = parse_number(args, &mut i)?;
                if allowance < 0.0 {
                    return Err(format!("--allowance must be zero or positive, got {}", allowance));
                }
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            arg if arg == "-" || !arg.starts_with('-') => svg_path = Some(args[i].as_str()),
            _ => {
                if !page.parse_flag(args, &mut i)? {
                    return Err(format!("Unknown option: {}", args[i]));
                }
            }
        }
        i += 1;
    }

    let svg_path = svg_path.ok_or("No SVG file specified")?;
    let svg = read_input(svg_path)?;
    let pieces = pieces_from_svg(&svg, allowance)?;

    let format = format
        .or_else(|| OutputFormat::from_path(&output_path))
        .unwrap_or(OutputFormat::Svg);
    let bytes = export_pieces(svg_path, Vec::new(), &pieces, format, &page)?;
    write_output(&output_path, &bytes)
}

fn print_usage() {
    eprintln!("Usage: seamster outline <file.svg> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -a, --allowance <cm>   Seam allowance (default: 1.0)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!("  -f, --format <fmt>     svg, pdf or json (default: from extension, else svg)");
    eprintln!("  --page <size>          a4, letter or fit (default: a4)");
    eprintln!("  --landscape            Rotate the page");
    eprintln!("  --margin <cm>          Page margin (default: 1.0)");
    eprintln!("  --overlap <cm>         Tile overlap (default: 1.5)");
    eprintln!("  --no-compress          PDF: leave content streams uncompressed");
    eprintln!();
    eprintln!("SVG user units are read as centimetres.");
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
  <rect x="0" y="0" width="20" height="10"/>
  <path d="M 30 0 L 40 0 L 40 10" fill="none" stroke="black"/>
  <circle cx="60" cy="60" r="5"/>
</svg>"#;

    #[test]
    fn closed_shapes_become_pieces() {
        let pieces = pieces_from_svg(SHAPES, 1.0).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].name, "Piece 1");
        // Allowance adds a cm on every side of the rectangle.
        let bbox = pieces[0].bounding_box;
        assert!((bbox.width() - 22.0).abs() < 1e-6);
        assert!((bbox.height() - 12.0).abs() < 1e-6);
    }

    #[test]
    fn zero_allowance_keeps_net_outline() {
        let pieces = pieces_from_svg(SHAPES, 0.0).unwrap();
        assert!(pieces[0].seam_allowance.is_none());
    }

    #[test]
    fn only_open_paths_is_an_error() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M 0 0 L 5 5" stroke="black"/></svg>"#;
        assert!(pieces_from_svg(svg, 1.0).is_err());
    }
}
