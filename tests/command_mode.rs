//! Integration tests for command mode (-c/--command) and sheet editing flags

use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetcalc"))
        // Tests must be deterministic and not depend on a user's ~/.config/sheetcalc/config.toml.
        .env("HOME", std::env::temp_dir())
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("sheetcalc-test-no-config"))
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_precedence_and_parentheses() {
    let (stdout, _, code) = run_command(&["-c", "3/(1+1)*(9-6)"]);
    assert_eq!(stdout.trim(), "4.5");
    assert_eq!(code, 0);
}

#[test]
fn test_division_by_zero_is_a_value() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert_eq!(stdout.trim(), "#ERROR: Division by 0.");
    assert_eq!(code, 0);
}

#[test]
fn test_undefined_variable() {
    let (stdout, _, code) = run_command(&["-c", "x + 1"]);
    assert_eq!(stdout.trim(), "#ERROR: Undefined variable.");
    assert_eq!(code, 0);
}

#[test]
fn test_malformed_formula_fails() {
    let (_, stderr, code) = run_command(&["-c", "1 +"]);
    assert!(stderr.contains("Error"));
    assert_eq!(code, 1);
}

#[test]
fn test_set_cells_and_print() {
    let (stdout, _, code) = run_command(&["-s", "A1=2", "-s", "B1==A1*10", "-s", "C1=total"]);
    assert_eq!(stdout.trim(), "A1: 2 => 2\nB1: =A1*10 => 20\nC1: total => total");
    assert_eq!(code, 0);
}

#[test]
fn test_circular_edit_fails() {
    let (_, stderr, code) = run_command(&["-s", "A1==B1", "-s", "B1==A1"]);
    assert!(stderr.contains("Circular"));
    assert_eq!(code, 1);
}

#[test]
fn test_save_then_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    let path_str = path.to_str().unwrap();

    let (_, _, code) = run_command(&["-s", "A1=4", "-s", "B1==A1/2", "-o", path_str]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_command(&[path_str, "-s", "A1=10"]);
    assert_eq!(stdout.trim(), "A1: 10 => 10\nB1: =A1/2 => 5");
    assert_eq!(code, 0);
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--bogus"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 1);
}
