use std::process::Command;

#[test]
fn test_missing_config_prints_one_line_and_exits_1() {
    let td = tempfile::tempdir().expect("tmpdir");
    let bin = env!("CARGO_BIN_EXE_pz");
    let out = Command::new(bin)
        .current_dir(td.path())
        .env_remove("PZ_LOG")
        .output()
        .expect("failed to run pz");

    assert_eq!(
        out.status.code(),
        Some(1),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout, "Missing \"./.pz.yaml\" file.\r\n");
}

#[test]
fn test_missing_explicit_config_names_path() {
    let td = tempfile::tempdir().expect("tmpdir");
    let missing = td.path().join("nope.yaml");
    let bin = env!("CARGO_BIN_EXE_pz");
    let out = Command::new(bin)
        .current_dir(td.path())
        .arg("--config")
        .arg(&missing)
        .output()
        .expect("failed to run pz");

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains(&format!("Missing \"{}\" file.", missing.display())),
        "stdout: {stdout}"
    );
}
