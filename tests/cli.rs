//! End-to-end runs of the `svgviewer` binary.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use svgviewer::{IcoSize, encoded_len};

const BIN: &str = env!("CARGO_BIN_EXE_svgviewer");

const SAMPLE: &str = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20">
    <!-- sample -->
    <rect x="1.23456" y="0" width="10" height="10" fill="#123456" class=""/>
</svg>"##;

fn run_with_stdin(args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = Command::new(BIN)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_optimize_file_with_stats() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.svg");
    let output = dir.path().join("out.svg");
    fs::write(&input, SAMPLE).unwrap();

    let result = Command::new(BIN)
        .args(["optimize", "--stats", "-o"])
        .arg(&output)
        .arg(&input)
        .output()
        .unwrap();
    assert!(result.status.success());

    let optimized = fs::read_to_string(&output).unwrap();
    assert_eq!(
        optimized,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20"><rect x="1.23" y="0" width="10" height="10" fill="#123456"/></svg>"##
    );

    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(stderr.contains(&format!("{} -> {} bytes", SAMPLE.len(), optimized.len())));
    assert!(stderr.contains("% smaller"));
}

#[test]
fn test_optimize_stdin_keep_flags() {
    let result = run_with_stdin(
        &["optimize", "--keep-comments", "--keep-xml-declaration", "-p", "3"],
        SAMPLE,
    );
    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.starts_with(r#"<?xml version="1.0"?>"#));
    assert!(stdout.contains("<!-- sample -->"));
    assert!(stdout.contains(r#"x="1.235""#));
}

#[test]
fn test_optimize_malformed_passthrough() {
    let result = run_with_stdin(&["optimize"], "<svg><g></svg>");
    assert!(result.status.success());
    assert_eq!(result.stdout, b"<svg><g></svg>");
}

#[test]
fn test_beautify_stdin() {
    let result = run_with_stdin(&["beautify"], "<svg><g><rect/></g></svg>");
    assert!(result.status.success());
    assert_eq!(
        String::from_utf8(result.stdout).unwrap(),
        "<svg>\n  <g>\n    <rect />\n  </g>\n</svg>"
    );
}

#[test]
fn test_convert_to_ico() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("icon.svg");
    fs::write(&input, SAMPLE).unwrap();

    let result = Command::new(BIN)
        .current_dir(dir.path())
        .args(["convert", "--format", "ico", "--size", "32"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(result.status.success());

    let bytes = fs::read(dir.path().join("converted.ico")).unwrap();
    assert_eq!(bytes.len(), encoded_len(IcoSize::S32));
    assert_eq!(&bytes[..6], &[0, 0, 1, 0, 1, 0]);
}

#[test]
fn test_convert_png_natural_size() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.svg");
    let output = dir.path().join("out.png");
    fs::write(&input, SAMPLE).unwrap();

    let result = Command::new(BIN)
        .args(["convert", "-o"])
        .arg(&output)
        .arg(&input)
        .output()
        .unwrap();
    assert!(result.status.success());

    let decoded = image::open(&output).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 20));
}

#[test]
fn test_convert_rejects_unsupported_icon_size() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bad.ico");

    let mut child = Command::new(BIN)
        .args(["convert", "--format", "ico", "--size", "24", "-o"])
        .arg(&output)
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(SAMPLE.as_bytes())
        .unwrap();
    let result = child.wait_with_output().unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert_eq!(stderr.matches("Conversion failed").count(), 1);
    assert!(stderr.contains("Unsupported icon size 24"));
}

#[test]
fn test_convert_malformed_input_without_size() {
    let dir = tempfile::tempdir().unwrap();

    let mut child = Command::new(BIN)
        .current_dir(dir.path())
        .args(["convert", "--format", "png"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"<svg><g></svg>")
        .unwrap();
    let result = child.wait_with_output().unwrap();

    assert!(!result.status.success());
    assert!(!dir.path().join("converted.png").exists());
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert_eq!(stderr.matches("Conversion failed").count(), 1);
    assert!(!stderr.contains("Svg(ParsingFailed"));
}
