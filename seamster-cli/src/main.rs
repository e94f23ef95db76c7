//! seamster - draft sewing patterns and export them for printing
//!
//! Usage:
//!   seamster draft <measurements.yaml> [-g garment] [-o out] [-f svg|pdf|json]
//!   seamster outline <file.svg> [-a cm] [-o out]
//!   seamster preview <measurements.yaml> [-o out.png] [--width px]
//!   seamster garments                 List available garments
//!   seamster --example                Print an example measurement file

mod cli;

use std::env;
use std::process;

use env_logger::Env;
use log::error;

use seamster::Garment;

use cli::{cmd_draft, cmd_outline, cmd_preview};

fn cmd_garments() {
    println!("Available garments:");
    for garment in Garment::all() {
        println!("  {:<10} {}", garment.name(), garment.description());
        println!("             requires: {}", garment.required_measurements().join(", "));
    }
}

fn print_usage(prog: &str) {
    eprintln!("seamster - draft sewing patterns and export them for printing");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} draft <measurements.yaml> [options]", prog);
    eprintln!("  {} outline <file.svg> [options]", prog);
    eprintln!("  {} preview <measurements.yaml> [options]", prog);
    eprintln!("  {} garments", prog);
    eprintln!("  {} --example [-g garment]", prog);
    eprintln!();
    eprintln!("Run '{} <command> --help' for the options of each command.", prog);
    eprintln!();
    eprintln!("Stdin support:");
    eprintln!("  Use '-' as input file to read from stdin:");
    eprintln!("  cat me.yaml | {} draft - -f pdf -o tee.pdf", prog);
    eprintln!();
    eprintln!("Logging:");
    eprintln!("  Progress goes to stderr; set RUST_LOG=debug for pipeline detail.");
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("seamster");

    let Some(command) = args.get(1) else {
        print_usage(prog);
        process::exit(1);
    };

    let result = match command.as_str() {
        "draft" => cmd_draft(&args[2..]),
        "outline" => cmd_outline(&args[2..]),
        "preview" => cmd_preview(&args[2..]),
        "garments" => {
            cmd_garments();
            Ok(())
        }
        // `--example` is shorthand for `draft --example`.
        "--example" => cmd_draft(&args[1..]),
        "help" | "--help" | "-h" => {
            print_usage(prog);
            Ok(())
        }
        other => Err(format!("Unknown command: {}", other)),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
