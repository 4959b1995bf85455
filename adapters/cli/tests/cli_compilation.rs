use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "lane-defence"])
        .status()
        .expect("failed to invoke cargo check for lane-defence CLI binary");

    assert!(status.success(), "cargo check --bin lane-defence should succeed");
}

#[test]
fn autopilot_run_reports_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_lane-defence"))
        .args(["--seed", "3", "--max-ticks", "200", "--json"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch lane-defence");

    assert!(output.status.success(), "autopilot run should succeed");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is JSON");
    assert_eq!(summary["tally"]["ticks"], 200);
    assert_eq!(summary["total_waves"], 5);
}

#[test]
fn missing_config_files_are_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_lane-defence"))
        .args(["--config", "does/not/exist.toml"])
        .output()
        .expect("failed to launch lane-defence");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read config"), "stderr: {stderr}");
}
