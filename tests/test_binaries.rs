//! Integration tests for the rsfec binary
//!
//! Tests the command-line interface and file round trips of:
//! - rsfec encode (append and parity-file modes)
//! - rsfec decode
//! - rsfec info

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the compiled binary
fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rsfec"))
}

fn rsfec(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute rsfec")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

fn sample_file(dir: &TempDir, len: usize) -> (PathBuf, Vec<u8>) {
    let content: Vec<u8> = (0..len).map(|i| (i * 131 + 7) as u8).collect();
    let path = dir.path().join("data.bin");
    fs::write(&path, &content).unwrap();
    (path, content)
}

// =============================================================================
// Command-line surface
// =============================================================================

#[test]
fn test_help() {
    let output = rsfec(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Reed-Solomon forward error correction"));
    assert!(stdout.contains("encode"));
    assert!(stdout.contains("decode"));
    assert!(stdout.contains("info"));
}

#[test]
fn test_version() {
    let output = rsfec(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("rsfec"));
}

#[test]
fn test_encode_help_lists_code_options() {
    let output = rsfec(&["encode", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for option in ["--symbol-size", "--field-poly", "--fcr", "--prim", "--num-roots"] {
        assert!(stdout.contains(option), "missing {}", option);
    }
    assert!(stdout.contains("--parity-file"));
    assert!(stdout.contains("--quiet"));
}

#[test]
fn test_decode_alias() {
    let output = rsfec(&["d", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--length"));
}

#[test]
fn test_info_default_code() {
    let output = rsfec(&["info"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(255, 223)"));
    assert!(stdout.contains("Correction capacity: 16 symbols"));
}

#[test]
fn test_info_hex_parameters() {
    let output = rsfec(&["info", "-m", "4", "-g", "0x13", "-r", "4"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("(15, 11)"));
}

#[test]
fn test_invalid_parameters_fail() {
    // 9-bit symbols do not fit in bytes
    let output = rsfec(&["info", "--symbol-size", "9", "--field-poly", "0x211"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid code parameters"));

    let output = rsfec(&["info", "--field-poly", "zz"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.bin");
    let output = rsfec(&["encode", "nonexistent.bin", path_str(&out)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

// =============================================================================
// File round trips
// =============================================================================

#[test]
fn test_encode_decode_round_trip() {
    let dir = TempDir::new().unwrap();
    let (input, content) = sample_file(&dir, 1000);
    let encoded = dir.path().join("data.rs");
    let decoded = dir.path().join("data.out");

    let output = rsfec(&["encode", "-q", path_str(&input), path_str(&encoded)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    // Five codewords, the last one zero padded
    assert_eq!(fs::metadata(&encoded).unwrap().len(), 5 * 255);

    let output = rsfec(&[
        "decode",
        "-q",
        "--length",
        "1000",
        path_str(&encoded),
        path_str(&decoded),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read(&decoded).unwrap(), content);
}

#[test]
fn test_decode_corrects_damage() {
    let dir = TempDir::new().unwrap();
    let (input, content) = sample_file(&dir, 223 * 3);
    let encoded = dir.path().join("data.rs");
    let decoded = dir.path().join("data.out");

    assert!(rsfec(&["encode", "-q", path_str(&input), path_str(&encoded)])
        .status
        .success());

    let mut damaged = fs::read(&encoded).unwrap();
    for codeword in damaged.chunks_mut(255) {
        for i in (0..255).step_by(17) {
            codeword[i] = !codeword[i];
        }
    }
    fs::write(&encoded, damaged).unwrap();

    let output = rsfec(&["decode", path_str(&encoded), path_str(&decoded)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Decoded 3 codewords"));
    assert!(stdout.contains("Corrected symbols: 45"));
    assert_eq!(fs::read(&decoded).unwrap(), content);
}

#[test]
fn test_parity_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let (input, content) = sample_file(&dir, 223 * 2);
    let data_out = dir.path().join("data.copy");
    let parity = dir.path().join("data.parity");
    let decoded = dir.path().join("data.out");

    let output = rsfec(&[
        "encode",
        "-q",
        "--parity-file",
        path_str(&parity),
        path_str(&input),
        path_str(&data_out),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read(&data_out).unwrap(), content);
    assert_eq!(fs::metadata(&parity).unwrap().len(), 2 * 32);

    // Damage the data copy only
    let mut damaged = content.clone();
    damaged[5] ^= 0xff;
    damaged[300] ^= 0x0f;
    fs::write(&data_out, damaged).unwrap();

    let output = rsfec(&[
        "decode",
        "-q",
        "-p",
        path_str(&parity),
        path_str(&data_out),
        path_str(&decoded),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read(&decoded).unwrap(), content);
}

#[test]
fn test_parity_file_length_mismatch() {
    let dir = TempDir::new().unwrap();
    let (input, _) = sample_file(&dir, 223);
    let parity = dir.path().join("short.parity");
    fs::write(&parity, [0u8; 10]).unwrap();

    let output = rsfec(&[
        "decode",
        "-p",
        path_str(&parity),
        path_str(&input),
        path_str(&dir.path().join("out")),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Parity file holds 10 bytes"));
}

#[test]
fn test_small_code_with_start_id() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..50u8).map(|i| i & 0x0f).collect();
    let input = dir.path().join("nibbles.bin");
    fs::write(&input, &content).unwrap();
    let encoded = dir.path().join("nibbles.rs");
    let decoded = dir.path().join("nibbles.out");

    let code = ["-m", "4", "-g", "0x13", "-r", "4", "--start-id", "sof"];

    let mut args = vec!["encode", "-q"];
    args.extend(code);
    args.extend([path_str(&input), path_str(&encoded)]);
    assert!(rsfec(&args).status.success());
    // 50 nibbles pad to 55 = 5 codewords of 15
    assert_eq!(fs::metadata(&encoded).unwrap().len(), 5 * 15);

    let mut args = vec!["decode", "-q", "-l", "50"];
    args.extend(code);
    args.extend([path_str(&encoded), path_str(&decoded)]);
    let output = rsfec(&args);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read(&decoded).unwrap(), content);
}

#[test]
fn test_length_beyond_decoded_size() {
    let dir = TempDir::new().unwrap();
    let (input, _) = sample_file(&dir, 223);
    let encoded = dir.path().join("data.rs");
    assert!(rsfec(&["encode", "-q", path_str(&input), path_str(&encoded)])
        .status
        .success());

    let output = rsfec(&[
        "decode",
        "-l",
        "500",
        path_str(&encoded),
        path_str(&dir.path().join("out")),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds decoded size"));
}
