//! The `taskdag` binary end to end.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use taskdag::TaskRecord;

use crate::fixtures::{chain_records, record};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write_listing(&self, name: &str, records: &[TaskRecord]) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
        path
    }

    /// Run the binary with HOME pointed into the sandbox so logs and config
    /// never touch the real home directory.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_taskdag"))
            .args(args)
            .env("HOME", self.path())
            .env_remove("TASKDAG_DEBUG")
            .output()
            .expect("failed to run taskdag")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_valid_listing() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());

    let output = sandbox.run(&["check", listing.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "3 tasks, 2 dependencies\nok\n");
    assert!(sandbox.path().join(".taskdag").join("taskdag.log").exists());
}

#[test]
fn test_check_reports_skipped_entries() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &[record(1, &[2]), record(2, &[1])]);

    let output = sandbox.run(&["check", listing.to_str().unwrap()]);

    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("2 tasks, 1 dependencies\n"));
    assert!(out.contains("skipped: Circular dependency detected"));
}

#[test]
fn test_order_puts_prerequisites_first() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());

    let output = sandbox.run(&["order", listing.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "1\n2\n3\n");
}

#[test]
fn test_can_depend_exit_codes() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());
    let listing = listing.to_str().unwrap();

    let accepted = sandbox.run(&["can-depend", listing, "3", "1"]);
    assert!(accepted.status.success());
    assert_eq!(stdout(&accepted), "ok\n");

    let rejected = sandbox.run(&["can-depend", listing, "1", "3"]);
    assert_eq!(rejected.status.code(), Some(1));
    let out = stdout(&rejected);
    assert!(out.starts_with("rejected: "));
    assert!(out.contains("1 -> 3 -> 2 -> 1"));

    let unknown = sandbox.run(&["can-depend", listing, "9", "1"]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(stdout(&unknown).contains("not found"));
}

#[test]
fn test_hit_and_layout_use_config() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());
    let listing = listing.to_str().unwrap();

    let on_first = sandbox.run(&["hit", listing, "300", "100"]);
    assert_eq!(stdout(&on_first), "1\n");
    let on_center = sandbox.run(&["hit", listing, "300", "300"]);
    assert_eq!(stdout(&on_center), "none\n");

    let config = sandbox.path().join("custom.toml");
    std::fs::write(
        &config,
        "[layout]\ncenter_x = 0.0\ncenter_y = 0.0\nradius = 100.0\n\n[hit]\nradius = 5.0\n",
    )
    .unwrap();
    let config = config.to_str().unwrap();

    let moved = sandbox.run(&["--config", config, "hit", listing, "0", "-98"]);
    assert_eq!(stdout(&moved), "1\n");
    let outside = sandbox.run(&["--config", config, "hit", listing, "0", "-90"]);
    assert_eq!(stdout(&outside), "none\n");

    let layout = sandbox.run(&["--config", config, "layout", listing]);
    assert!(layout.status.success());
    let positions: serde_json::Value = serde_json::from_slice(&layout.stdout).unwrap();
    assert_eq!(positions.as_object().unwrap().len(), 3);
    let first = &positions["1"];
    assert!(first["x"].as_f64().unwrap().abs() < 1e-9);
    assert!((first["y"].as_f64().unwrap() + 100.0).abs() < 1e-9);
}

#[test]
fn test_missing_listing_fails() {
    let sandbox = Sandbox::new();
    let missing = sandbox.path().join("missing.json");

    let output = sandbox.run(&["check", missing.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}

#[test]
fn test_double_debug_flag_writes_trace_lines() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());
    let listing = listing.to_str().unwrap();
    let log = sandbox.path().join(".taskdag").join("taskdag.log");

    sandbox.run(&["-d", "hit", listing, "300", "100"]);
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("[DEBUG]"));
    assert!(!text.contains("[TRACE]"));

    sandbox.run(&["-dd", "hit", listing, "300", "100"]);
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("[TRACE] hit pointer=(300, 100)"));
}

#[test]
fn test_trace_level_from_environment() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());

    let output = Command::new(env!("CARGO_BIN_EXE_taskdag"))
        .args(["hit", listing.to_str().unwrap(), "300", "100"])
        .env("HOME", sandbox.path())
        .env("TASKDAG_DEBUG", "trace")
        .output()
        .expect("failed to run taskdag");

    assert!(output.status.success());
    let log = sandbox.path().join(".taskdag").join("taskdag.log");
    assert!(std::fs::read_to_string(log).unwrap().contains("[TRACE]"));
}

#[test]
fn test_render_svg() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());

    let output = sandbox.run(&["render", listing.to_str().unwrap(), "--format", "svg"]);

    assert!(output.status.success());
    let svg = stdout(&output);
    assert!(svg.starts_with("<?xml"));
    assert_eq!(svg.matches("<circle").count(), 3);
    assert_eq!(svg.matches("<line").count(), 2);
    assert!(svg.contains(">task-2</text>"));
}

#[test]
fn test_render_json_by_default() {
    let sandbox = Sandbox::new();
    let listing = sandbox.write_listing("tasks.json", &chain_records());

    let output = sandbox.run(&["render", listing.to_str().unwrap()]);

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(state["edges"].as_array().unwrap().len(), 2);
}
