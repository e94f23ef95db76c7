//! Integration tests for seamster CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn seamster(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seamster"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// A scratch file unique to this test process.
fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("seamster-{}-{}", std::process::id(), name))
}

const TEE: &str = r#"
name: Test tee
garment: tshirt
measurements:
  chest: 100
  half_back: 19
  back_neck_to_waist: 44
  scye_depth: 21
  neck_size: 39
  sleeve_length: 64
  close_wrist: 17
  finished_length: 72
"#;

const TROUSERS: &str = r#"
name: Test trousers
waist_dart: true
measurements:
  body_rise: 28
  inside_leg: 80
  seat_measurement: 100
  waist_measurement: 82
"#;

fn write_scratch(name: &str, content: &str) -> PathBuf {
    let path = scratch(name);
    fs::write(&path, content).expect("Failed to write scratch file");
    path
}

#[test]
fn garments_command_lists_all_garments() {
    let output = seamster(&["garments"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tshirt"), "Should list the T-shirt");
    assert!(stdout.contains("trousers"), "Should list trousers");
    assert!(stdout.contains("seat_measurement"), "Should list required measurements");
}

#[test]
fn example_prints_measurement_yaml() {
    let output = seamster(&["--example"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("garment: tshirt"));
    assert!(stdout.contains("chest:"));

    let output = seamster(&["draft", "--example", "-g", "trousers"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("inside_leg:"));
}

#[test]
fn draft_command_produces_svg() {
    let input = write_scratch("tee.yaml", TEE);
    let output = seamster(&["draft", input.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<?xml"), "Should have XML declaration");
    assert!(stdout.contains("<svg"), "Should have SVG element");
    assert!(stdout.contains("Front R1C1"), "Should label the front's first page");
    assert!(stdout.contains("Sleeve"), "Should include the sleeve");
    assert!(stdout.contains("</svg>"), "Should close SVG element");
}

#[test]
fn draft_command_writes_pdf_file() {
    let input = write_scratch("tee-pdf.yaml", TEE);
    let pdf = scratch("tee.pdf");
    let output = seamster(&["draft", input.to_str().unwrap(), "-o", pdf.to_str().unwrap(), "--page", "letter"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&pdf).expect("PDF should be written");
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    let _ = fs::remove_file(&pdf);
}

#[test]
fn draft_command_produces_json() {
    let input = write_scratch("trousers.yaml", TROUSERS);
    let output = seamster(&["draft", input.to_str().unwrap(), "-g", "trousers", "-f", "json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["units"], "cm");
    let pieces = json["pieces"].as_array().expect("pieces array");
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0]["name"], "Front");
    assert_eq!(pieces[0]["darts"].as_array().map(|d| d.len()), Some(1));
    assert!(pieces[0]["seam_allowance"].is_array());
}

#[test]
fn hem_option_adds_hems() {
    let input = write_scratch("trousers-hem.yaml", TROUSERS);
    let output = seamster(&["draft", input.to_str().unwrap(), "-g", "trousers", "-f", "json", "--hem", "3"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    for piece in json["pieces"].as_array().expect("pieces array") {
        let hems = piece["hems"].as_array().expect("hems array");
        assert_eq!(hems.len(), 1);
        assert_eq!(hems[0]["width"], 3.0);
    }

    let output = seamster(&["draft", input.to_str().unwrap(), "-g", "trousers", "--hem", "-2"]);
    assert!(!output.status.success());
}

#[test]
fn draft_without_garment_fails() {
    let input = write_scratch("no-garment.yaml", TROUSERS);
    let output = seamster(&["draft", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No garment"));
}

#[test]
fn missing_measurements_fail() {
    let input = write_scratch("short.yaml", "garment: tshirt\nmeasurements:\n  chest: 100\n");
    let output = seamster(&["draft", input.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("neck_size"), "Should name a missing measurement: {}", stderr);
}

#[test]
fn outline_command_adds_allowance() {
    let svg = write_scratch(
        "shapes.svg",
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 30 30"><rect x="0" y="0" width="10" height="10"/></svg>"#,
    );
    let output = seamster(&["outline", svg.to_str().unwrap(), "-a", "1.5", "-f", "json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    let bbox = json["pieces"][0]["bounding_box"].as_array().expect("bbox");
    let width = bbox[2].as_f64().unwrap() - bbox[0].as_f64().unwrap();
    assert!((width - 13.0).abs() < 1e-6);
}

#[test]
fn preview_command_writes_png() {
    let input = write_scratch("tee-preview.yaml", TEE);
    let png = scratch("tee.png");
    let output = seamster(&[
        "preview",
        input.to_str().unwrap(),
        "--page",
        "fit",
        "--width",
        "300",
        "-o",
        png.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&png).expect("PNG should be written");
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    let _ = fs::remove_file(&png);
}

#[test]
fn unknown_command_fails() {
    let output = seamster(&["knit"]);
    assert!(!output.status.success());
}
