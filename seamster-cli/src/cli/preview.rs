//! `seamster preview`: rasterise the SVG export to a PNG.

use log::info;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use super::common::{export_pieces, flag_value, write_output, OutputFormat, PageArgs};
use super::draft::DraftArgs;

const DEFAULT_WIDTH: u32 = 1600;
const MAX_WIDTH: u32 = 8000;

/// Render SVG markup `width` pixels wide, keeping its aspect ratio.
pub fn render_png(svg: &str, width: u32) -> Result<Vec<u8>, String> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;
    let size = tree.size();
    let scale = width as f32 / size.width();
    let height = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| format!("Cannot allocate a {}x{} image", width, height))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    info!("Rendered {}x{} preview", width, height);

    pixmap.encode_png().map_err(|e| format!("Failed to encode PNG: {}", e))
}

pub fn cmd_preview(args: &[String]) -> Result<(), String> {
    let mut draft = DraftArgs::default();
    let mut page = PageArgs::default();
    let mut output_path = "preview.png".to_string();
    let mut width = DEFAULT_WIDTH;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => output_path = flag_value(args, &mut i)?.to_string(),
            "-w" | "--width" => {
                let value = flag_value(args, &mut i)?;
                width = value
                    .parse::<u32>()
                    .ok()
                    .filter(|w| (1..=MAX_WIDTH).contains(w))
                    .ok_or_else(|| format!("--width must be between 1 and {}, got {}", MAX_WIDTH, value))?;
            }
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

    let pattern = draft.draft()?;
    let svg = export_pieces(&pattern.name, Vec::new(), &pattern.pieces, OutputFormat::Svg, &page)?;
    let svg = String::from_utf8(svg).map_err(|e| e.to_string())?;
    let png = render_png(&svg, width)?;
    write_output(&output_path, &png)
}

fn print_usage() {
    eprintln!("Usage: seamster preview <measurements.yaml> [options]");
    eprintln!();
    eprintln!("Takes the same drafting and page options as `seamster draft`, plus:");
    eprintln!("  -o, --output <file>    PNG file (- for stdout, default: preview.png)");
    eprintln!("  -w, --width <px>       Image width (default: {})", DEFAULT_WIDTH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_at_requested_width() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20cm" height="10cm" viewBox="0 0 20 10">
  <rect width="20" height="10" fill="white"/>
  <line x1="0" y1="0" x2="20" y2="10" stroke="black" stroke-width="0.1"/>
</svg>"#;
        let png = render_png(svg, 200).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let pixmap = Pixmap::decode_png(&png).unwrap();
        assert_eq!(pixmap.width(), 200);
        assert_eq!(pixmap.height(), 100);
    }

    #[test]
    fn invalid_svg_is_an_error() {
        assert!(render_png("not svg", 100).is_err());
    }
}
