use std::process::Command;

#[test]
fn test_lightbox_version() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "lightbox", "--", "--version"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_lightbox_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "lightbox", "--", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modules"));
    assert!(stdout.contains("settings"));
}

#[test]
fn test_lightbox_modules_list_empty_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("lightbox.toml");
    std::fs::write(
        &config_path,
        format!(
            "[paths]\nmodules_dir = \"{}\"\n",
            dir.path().join("modules").display()
        ),
    )
    .unwrap();

    let output = Command::new("cargo")
        .args(["run", "--bin", "lightbox", "--"])
        .arg("--config")
        .arg(&config_path)
        .args(["modules", "list"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No modules discovered"));
}
