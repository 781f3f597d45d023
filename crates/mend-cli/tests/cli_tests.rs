//! Binary-level tests for `mend`.
//!
//! Every command runs inside a fresh temporary directory with the
//! knowledge base and user configuration redirected into it.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const APP: &str = "export function App() {\n  const [n, setN] = useState(0);\n  return n;\n}\n";
const TSC: &str = "src/App.tsx(2,21): error TS2304: Cannot find name 'useState'.\n";

fn mend(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mend");
    cmd.current_dir(dir)
        .env("MEND_KNOWLEDGE__PATH", dir.join("kb.json"))
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("XDG_DATA_HOME", dir.join(".data"))
        .env_remove("RUST_LOG")
        .env_remove("MEND_OUTPUT__FORMAT")
        .env_remove("MEND_LOG_FORMAT");
    cmd
}

/// A project with one missing import and the compiler output for it.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/App.tsx"), APP).unwrap();
    fs::write(dir.path().join("tsc.txt"), TSC).unwrap();
    dir
}

fn json_stdout(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn help_lists_the_commands() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("suggest"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("learn"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_argument_exits_two() {
    let dir = TempDir::new().unwrap();
    mend(dir.path()).args(["analyze", "--bogus"]).assert().code(2);
}

#[test]
fn analyze_emits_comprehensive_json() {
    let dir = project();
    let reports = json_stdout(mend(dir.path()).args([
        "analyze",
        "tsc.txt",
        "--output-format",
        "json",
    ]));

    let report = &reports.as_array().unwrap()[0];
    assert_eq!(report["analysis"]["error"]["code"], 2304);
    assert!(!report["analysis"]["rootCause"].as_str().unwrap().is_empty());
    assert!(!report["fixes"].as_array().unwrap().is_empty());
    assert!(!report["preventionTips"].as_array().unwrap().is_empty());
    assert!(!report["learningResources"].as_array().unwrap().is_empty());
}

#[test]
fn json_runs_log_json_lines_to_stderr() {
    let dir = project();
    let out = mend(dir.path())
        .args(["-v", "analyze", "tsc.txt", "--output-format", "json"])
        .assert()
        .success()
        .get_output()
        .clone();
    serde_json::from_slice::<Value>(&out.stdout).unwrap();

    let events: Vec<Value> = String::from_utf8(out.stderr)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(events.iter().any(|e| {
        e["level"] == "INFO" && e["fields"]["message"] == "Mend completed successfully"
    }));
}

#[test]
fn log_format_flag_overrides_json_output() {
    let dir = project();
    mend(dir.path())
        .args([
            "-v",
            "--log-format",
            "text",
            "analyze",
            "tsc.txt",
            "--output-format",
            "json",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Mend completed successfully"))
        .stderr(predicate::str::contains("\"fields\"").not());
}

#[test]
fn analyze_prints_human_text() {
    let dir = project();
    mend(dir.path())
        .args(["analyze", "tsc.txt", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Root cause:"))
        .stdout(predicate::str::contains("2304-add-missing-import"));
}

#[test]
fn suggest_limits_fixes() {
    let dir = project();
    let all = json_stdout(mend(dir.path()).args([
        "suggest",
        "tsc.txt",
        "--limit",
        "1",
        "--output-format",
        "json",
    ]));

    let fixes = all[0]["fixes"].as_array().unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0]["id"], "2304-add-missing-import");
    assert!(fixes[0]["confidence"].as_f64().unwrap() >= 0.7);
}

#[test]
fn json_diagnostics_are_accepted() {
    let dir = project();
    fs::write(
        dir.path().join("diagnostics.json"),
        r#"{ "diagnostics": [ { "file": "src/App.tsx", "line": 2, "column": 21,
             "code": 2304, "message": "Cannot find name 'useState'." } ] }"#,
    )
    .unwrap();

    let all = json_stdout(mend(dir.path()).args([
        "suggest",
        "diagnostics.json",
        "--output-format",
        "json",
    ]));
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[test]
fn dry_run_leaves_the_file_untouched() {
    let dir = project();
    mend(dir.path())
        .args(["apply", "tsc.txt", "--dry-run", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "+ import { useState } from 'react';",
        ));

    assert_eq!(fs::read_to_string(dir.path().join("src/App.tsx")).unwrap(), APP);
    assert!(!dir.path().join("kb.json").exists());
}

#[test]
fn apply_without_confirmation_is_refused() {
    let dir = project();
    mend(dir.path())
        .args(["apply", "tsc.txt"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    assert_eq!(fs::read_to_string(dir.path().join("src/App.tsx")).unwrap(), APP);
}

#[test]
fn apply_writes_the_fix_and_learns_from_it() {
    let dir = project();
    let outcomes = json_stdout(mend(dir.path()).args([
        "apply",
        "tsc.txt",
        "--yes",
        "--output-format",
        "json",
    ]));
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[0]["state"], "committed");

    let source = fs::read_to_string(dir.path().join("src/App.tsx")).unwrap();
    assert!(source.starts_with("import { useState } from 'react';\n"));

    let stats = json_stdout(mend(dir.path()).args(["kb", "stats", "--output-format", "json"]));
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["observedResolutions"], 1);
    assert_eq!(stats["successes"], 1);
}

#[test]
fn unknown_fix_id_exits_three() {
    let dir = project();
    mend(dir.path())
        .args(["apply", "tsc.txt", "--fix", "2304-nope", "--yes"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("2304-nope"));
}

#[test]
fn learn_then_show() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args([
            "learn",
            "--code",
            "TS2531",
            "--solution",
            "Guard with a null check",
            "--minutes",
            "3",
            "--feedback",
            "helpful",
        ])
        .assert()
        .success();

    let entry = json_stdout(mend(dir.path()).args([
        "kb",
        "show",
        "TS2531:STRICT_MODE_ERROR",
        "--output-format",
        "json",
    ]));
    assert_eq!(entry["observedResolutions"], 1);
    assert_eq!(entry["averageTimeToResolve"], 3.0);
    assert!(entry["derivedConfidenceAdjustment"].as_f64().unwrap() > 0.0);
}

#[test]
fn kb_list_is_empty_initially() {
    let dir = TempDir::new().unwrap();
    let entries = json_stdout(mend(dir.path()).args(["kb", "list", "--output-format", "json"]));
    assert_eq!(entries, Value::Array(Vec::new()));
}

#[test]
fn unknown_signature_exits_three() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args(["kb", "show", "TS2304:IMPORT_ERROR"])
        .assert()
        .code(3);
}

#[test]
fn malformed_signature_exits_two() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args(["kb", "show", "not-a-signature"])
        .assert()
        .code(2);
}

#[test]
fn missing_input_exits_three() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args(["analyze", "missing.txt"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn invalid_diagnostic_exits_two() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"[{ "file": "a.ts", "line": 0, "column": 1, "code": 1005, "message": "';' expected." }]"#,
    )
    .unwrap();
    mend(dir.path()).args(["analyze", "bad.json"]).assert().code(2);
}

#[test]
fn invalid_rule_pack_exits_four() {
    let dir = project();
    fs::write(
        dir.path().join("pack.toml"),
        r#"
[[rule]]
id = "broken"
codes = [2304]
message_pattern = "Cannot find name '(unclosed"
description = "Never loaded"
fix_type = "manual"
confidence = 0.5
post_conditions = ["diagnostic no longer reported"]
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(".mend.toml"),
        "[rules]\npaths = [\"pack.toml\"]\n",
    )
    .unwrap();
    mend(dir.path())
        .args(["suggest", "tsc.txt"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn config_get_reads_environment_overrides() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .env("MEND_ENGINE__RELATED_LINE_WINDOW", "7")
        .args(["config", "get", "engine.related_line_window"])
        .assert()
        .success()
        .stdout(predicate::str::contains("engine.related_line_window = 7"));
}

#[test]
fn invalid_configuration_exits_four() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .env("MEND_OUTPUT__FORMAT", "yaml")
        .args(["kb", "stats"])
        .assert()
        .code(4);
}

#[test]
fn missing_explicit_config_exits_four() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args(["--config", "nowhere.toml", "kb", "stats"])
        .assert()
        .code(4);
}

#[test]
fn init_local_writes_a_loadable_config() {
    let dir = TempDir::new().unwrap();
    mend(dir.path()).args(["init", "--local"]).assert().success();
    let written = fs::read_to_string(dir.path().join(".mend.toml")).unwrap();
    assert!(written.contains("[engine]"));

    mend(dir.path())
        .args(["config", "get", "engine.history_cap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));
}

#[test]
fn completions_are_generated() {
    let dir = TempDir::new().unwrap();
    mend(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mend"));
}
