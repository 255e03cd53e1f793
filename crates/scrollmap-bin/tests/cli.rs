//! Runs the binary end to end inside a scratch directory.

use std::process::Command;

fn source(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("fn item_{i}() -> usize {{ {i} }}\n"))
        .collect()
}

#[test]
fn writes_ppm_and_reports_viewport() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.rs");
    std::fs::write(&input, source(100)).unwrap();
    let out = dir.path().join("map.ppm");

    let output = Command::new(env!("CARGO_BIN_EXE_scrollmap"))
        .current_dir(dir.path())
        .arg(&input)
        .args(["--width", "80", "--height", "300", "--rows", "20", "--click", "300"])
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    // 101 blocks (trailing newline) with 20 rows: clicking the bottom scrolls to the end.
    assert!(stdout.contains("value=81 max=81"), "{stdout}");

    let image = std::fs::read(&out).unwrap();
    let header = b"P6\n80 300\n255\n";
    assert!(image.starts_with(header));
    assert_eq!(image.len(), header.len() + 80 * 300 * 3);
}

/// `(value, max, viewport bottom)` from the summary line.
fn summary(stdout: &str) -> (i32, i32, f64) {
    let field = |key: &str| {
        stdout
            .split_whitespace()
            .find_map(|w| w.strip_prefix(key))
            .unwrap()
            .to_string()
    };
    let viewport: Vec<f64> = field("viewport=")
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    (
        field("value=").parse().unwrap(),
        field("max=").parse().unwrap(),
        viewport[1] + viewport[3],
    )
}

#[test]
fn wrapped_editor_keeps_viewport_inside_control() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.rs");
    std::fs::write(&input, source(100)).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_scrollmap"))
        .current_dir(dir.path())
        .arg(&input)
        .args(["--height", "300", "--rows", "20", "--wrap-columns", "10", "--click", "300"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let (value, max, bottom) = summary(&stdout);
    // Wrapping lays 100 source lines out on far more than 101 visual lines.
    assert!(max > 81, "{stdout}");
    assert_eq!(value, max, "{stdout}");
    assert!(bottom <= 300.11, "{stdout}");
}

#[test]
fn missing_input_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_scrollmap"))
        .current_dir(dir.path())
        .arg(dir.path().join("absent.txt"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.txt"));
}
