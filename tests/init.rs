use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_churn"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "churn init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".churn.toml");
    assert!(config_path.exists(), ".churn.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[churn]"));

    // Every key is commented out, so it must parse to the defaults
    let config: churn_core::ChurnConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.churn.minimum_churn_count, 5);
    assert!(config.churn.start_date.is_none());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".churn.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_churn"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".churn.toml")).unwrap();
    assert_eq!(content, "# existing");
}
