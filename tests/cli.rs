use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn framesnap_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("framesnap").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .args(["--width", "32", "--height", "18"]);
    cmd
}

#[test]
fn framesnap_help_prints_usage() {
    Command::cargo_bin("framesnap")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Capture a rendered frame to PNG or EXR",
        ));
}

#[test]
fn player_capture_writes_png() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("shots");

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--no-timestamp", "--dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("shot.png").and(predicate::str::contains("32x18")));

    assert!(out.join("shot.png").exists());
}

#[test]
fn hdr_capture_writes_exr() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--no-timestamp", "--hdr", "--dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("shot.exr").and(predicate::str::contains("hdr")));

    assert!(temp.path().join("shot.exr").exists());
    assert!(!temp.path().join("shot.png").exists());
}

#[test]
fn hdr_request_on_ldr_scene_writes_png() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("framesnap.toml");
    std::fs::write(&config, "[scene]\nhdr_enabled = false\n").unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--no-timestamp", "--hdr", "--config"])
        .arg(&config)
        .arg("--dir")
        .arg(temp.path())
        .assert()
        .success();

    assert!(temp.path().join("shot.png").exists());
    assert!(!temp.path().join("shot.exr").exists());
}

#[test]
fn viewport_capture_with_ui_and_custom_camera() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "ui", "--no-timestamp", "--ui", "--dir"])
        .arg(temp.path())
        .assert()
        .success();
    framesnap_cmd(&temp)
        .args([
            "--filename",
            "top",
            "--no-timestamp",
            "--camera",
            "0,0,500,-90,0,0,60",
            "--ortho",
            "800",
            "--dir",
        ])
        .arg(temp.path())
        .assert()
        .success();

    assert!(temp.path().join("ui.png").exists());
    assert!(temp.path().join("top.png").exists());
}

#[test]
fn oversized_width_is_clamped() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("framesnap")
        .expect("binary exists")
        .env("XDG_CONFIG_HOME", temp.path())
        .env_remove("RUST_LOG")
        .args(["--width", "70000", "--height", "18"])
        .args(["--filename", "wide", "--no-timestamp", "--dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("8192x18"));

    assert!(temp.path().join("wide.png").exists());
}

#[test]
fn traversal_filename_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("shots");

    framesnap_cmd(&temp)
        .args(["--filename", "../evil", "--dir"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Screenshot failed"));

    assert!(!out.exists());
    assert!(!temp.path().join("evil.png").exists());
}

#[test]
fn missing_player_fails() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--no-timestamp", "--no-player", "--dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Screenshot failed"));

    assert!(!temp.path().join("shot.png").exists());
}

#[test]
fn malformed_camera_is_rejected() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--camera", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 7 comma-separated values"));
}

#[test]
fn load_prints_dimensions() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .args(["--filename", "shot", "--no-timestamp", "--dir"])
        .arg(temp.path())
        .assert()
        .success();

    framesnap_cmd(&temp)
        .arg("--load")
        .arg(temp.path().join("shot.png"))
        .assert()
        .success()
        .stdout(predicate::str::contains("32x18 (ldr)"));
}

#[test]
fn load_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    framesnap_cmd(&temp)
        .arg("--load")
        .arg(temp.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not load screenshot"));
}
