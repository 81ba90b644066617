//! Integration tests for the CLI interface
//!
//! Every test points the binary at its own config directory so nothing from
//! the developer's environment leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn llmpipe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("llmpipe").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("LLMPIPE_CONFIG")
        .env_remove("LLMPIPE_PROGRAM")
        .env_remove("LLMPIPE_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("llmpipe.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_cli_help_flag() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .arg("invalid-command")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_run_streams_lines_and_strips_crlf() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "sh", "-c", "printf 'one\\r\\ntwo\\nthree'"])
        .assert()
        .success()
        .stdout("one\ntwo\nthree\n");
}

#[test]
fn test_run_writes_input_with_newline() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "--input", "ping", "cat"])
        .assert()
        .success()
        .stdout("ping\n");
}

#[test]
fn test_run_passes_child_exit_code_through() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "sh", "-c", "echo partial; exit 3"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("partial"));
}

#[test]
fn test_run_keeps_stderr_off_stdout() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "sh", "-c", "echo out; echo err >&2"])
        .assert()
        .success()
        .stdout("out\n")
        .stderr(predicate::str::contains("err"));
}

#[test]
fn test_run_missing_program_exits_127() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "llmpipe-no-such-program-12345"])
        .assert()
        .code(127)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_json_events() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["run", "--json", "sh", "-c", "echo hi; echo warn >&2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"type":"line","text":"hi"}"#))
        .stdout(predicate::str::contains(r#"{"type":"diagnostic","text":"warn"}"#))
        .stdout(predicate::str::contains(
            r#"{"type":"completed","success":true,"exit_code":0,"error":null}"#,
        ));
}

#[test]
fn test_ask_substitutes_prompt_into_args() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        home.path(),
        r#"
[model]
program = "sh"
args = ["-c", "echo thinking; echo \"$1 says: $0\"", "{prompt}", "{model}"]
model = "fake-model"
"#,
    );

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .args(["ask", "hello", "there"])
        .assert()
        .success()
        .stdout("thinking\nfake-model says: hello there\n");
}

#[test]
fn test_ask_sends_prompt_on_stdin_without_placeholder() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "[model]\nprogram = \"cat\"\nargs = []\n");

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .args(["ask", "echo me"])
        .assert()
        .success()
        .stdout("echo me\n");
}

#[test]
fn test_ask_prefix_and_model_flag() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        home.path(),
        r#"
[model]
program = "sh"
args = ["-c", "echo $0", "{model}"]

[stream]
prefix = "> "
"#,
    );

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .args(["ask", "--model", "override", "anything"])
        .assert()
        .success()
        .stdout("> override\n");
}

#[test]
fn test_ask_missing_program_prints_fallback() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["ask", "--program", "llmpipe-no-such-model-12345", "hi"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("Error processing your request."));
}

#[test]
fn test_ask_program_from_environment() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "[model]\nargs = [\"-c\", \"echo from env\"]\n");

    llmpipe(home.path())
        .env("LLMPIPE_PROGRAM", "sh")
        .arg("--config")
        .arg(&config)
        .args(["ask", "ignored"])
        .assert()
        .success()
        .stdout("from env\n");
}

#[test]
fn test_ask_blank_prompt_is_usage_error() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .args(["ask", "   "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prompt"))
        .stderr(predicate::str::contains("Error processing your request.").not());
}

#[test]
fn test_ask_failing_model_reports_cause() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        home.path(),
        r#"
[model]
program = "sh"
args = ["-c", "echo 'Error: pull model manifest: file does not exist' >&2; exit 1"]
"#,
    );

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .args(["ask", "hi"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error processing your request."))
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn test_config_prints_defaults() {
    let home = TempDir::new().unwrap();
    llmpipe(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("program = \"ollama\""))
        .stdout(predicate::str::contains("deepseek-r1:latest"));
}

#[test]
fn test_config_reflects_file() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "[model]\nmodel = \"qwen2\"\n");

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("model = \"qwen2\""));
}

#[test]
fn test_invalid_config_exits_2() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "[model\n");

    llmpipe(home.path())
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("llmpipe.toml"));
}
