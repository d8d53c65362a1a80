use std::fs;
use std::io::Write;
use std::process::Command;

use tempfile::{NamedTempFile, TempDir};

fn run_psh(command: &str) -> std::process::Output {
    let config_home = TempDir::new().expect("create config dir");
    Command::new(env!("CARGO_BIN_EXE_psh"))
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["-c", command])
        .output()
        .expect("failed to execute psh")
}

#[test]
fn input_redirect_feeds_command() {
    let mut input = NamedTempFile::new().expect("create temp input");
    writeln!(input, "hello").unwrap();
    writeln!(input, "world").unwrap();

    let cmd = format!("/bin/cat < {}", input.path().display());
    let output = run_psh(&cmd);

    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\nworld\n");
}

#[test]
fn input_redirect_missing_file_returns_error() {
    let dir = TempDir::new().unwrap();
    let missing_path = dir.path().join("psh_missing_input_test.txt");
    let cmd = format!("/bin/cat < {}", missing_path.display());
    let output = run_psh(&cmd);

    assert!(
        !output.status.success(),
        "command unexpectedly succeeded: {:?}",
        output
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.starts_with(&format!("psh: {}: ", missing_path.display())),
        "stderr did not name the missing file: {stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn output_redirect_truncates_file() {
    let output_file = NamedTempFile::new().expect("create temp output");
    let path = output_file.path().to_path_buf();
    fs::write(&path, "a much longer previous content").unwrap();

    let cmd = format!("echo -n sample > {}", path.display());
    let output = run_psh(&cmd);
    assert!(output.status.success(), "command failed: {:?}", output);
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(&path).expect("read redirected output");
    assert_eq!(written, "sample");
}

#[test]
fn both_redirects_on_one_stage() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.txt");
    let output_path = dir.path().join("out.txt");
    fs::write(&input, "3\n1\n2\n").unwrap();

    let cmd = format!("sort > {} < {}", output_path.display(), input.display());
    let output = run_psh(&cmd);
    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "1\n2\n3\n");
}

#[test]
fn missing_redirect_path_is_a_syntax_error() {
    let output = run_psh("cat <");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("syntax error"), "{stderr}");
}
