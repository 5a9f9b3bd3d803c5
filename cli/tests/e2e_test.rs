// Copyright 2025 bgpgg Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end tests that execute the compiled CLI binary

use std::io::Write;
use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_peerattr"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn write_temp_yaml(name: &str, content: &str) -> String {
    let temp_file = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&temp_file).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    temp_file.to_str().unwrap().to_string()
}

const CONFIG: &str = r#"
asn: 100
peer-groups:
  - name: PG-TEST
    remote_as: 200
    settings:
      - passive
peers:
  - address: "1.1.1.1"
    peer-group: PG-TEST
    address-families:
      ipv4-unicast:
        settings:
          - no send-community
"#;

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BGP neighbor attribute inheritance tool"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("show"));
}

#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("peerattr"));
}

#[test]
fn test_missing_subcommand() {
    let output = run_cli(&[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
}

#[test]
fn test_check_single_attribute() {
    let output = run_cli(&["check", "--attr", "passive", "--verbose"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[test] peer\\passive"));
    assert!(stdout.contains("1 scenarios, 0 failed"));
}

#[test]
fn test_check_unknown_attribute() {
    let output = run_cli(&["check", "--attr", "frobnicate"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no scenarios"));
}

#[test]
fn test_render_config() {
    let path = write_temp_yaml("peerattr_e2e_render.yaml", CONFIG);
    let output = run_cli(&["render", &path]);
    std::fs::remove_file(&path).unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("router bgp 100\n"));
    assert!(stdout.contains(" neighbor PG-TEST passive\n"));
    assert!(stdout.contains(" neighbor 1.1.1.1 peer-group PG-TEST\n"));
    assert!(stdout.contains("  no neighbor 1.1.1.1 send-community\n"));
}

#[test]
fn test_show_effective_state() {
    let path = write_temp_yaml("peerattr_e2e_show.yaml", CONFIG);
    let output = run_cli(&["show", &path, "1.1.1.1", "passive"]);
    let af_output = run_cli(&[
        "show",
        &path,
        "1.1.1.1",
        "send-community",
        "--afi-safi",
        "ipv4-unicast",
    ]);
    std::fs::remove_file(&path).unwrap();

    assert!(output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["value"], true);
    assert_eq!(state["overridden"], false);

    assert!(af_output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&af_output.stdout).unwrap();
    assert_eq!(state["value"], false);
    assert_eq!(state["overridden"], true);
    assert_eq!(state["inverted"], true);
}

#[test]
fn test_render_missing_config() {
    let output = run_cli(&["render", "/nonexistent/peerattr.yaml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"));
}

#[test]
fn test_log_level_from_config() {
    let config = format!("log_level: debug\n{}", CONFIG);
    let path = write_temp_yaml("peerattr_e2e_log_level.yaml", &config);
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_peerattr"))
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute command")
    };
    let from_config = run(&["render", &path]);
    let from_flag = run(&["--log-level", "error", "render", &path]);
    std::fs::remove_file(&path).unwrap();

    assert!(from_config.status.success());
    assert!(String::from_utf8_lossy(&from_config.stderr).contains("attribute set"));
    assert!(from_flag.status.success());
    assert!(!String::from_utf8_lossy(&from_flag.stderr).contains("attribute set"));
}
