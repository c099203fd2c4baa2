use std::process::Command;

#[test]
fn test_cli_doctor_exits_zero() {
    let td = tempfile::tempdir().expect("tmpdir");
    let bin = env!("CARGO_BIN_EXE_pz");
    let out = Command::new(bin)
        .current_dir(td.path())
        .arg("--doctor")
        .env("PZ_SKIP_DOCKER", "1")
        .output()
        .expect("failed to run pz --doctor");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        out.status.success(),
        "pz --doctor exited non-zero: {:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        stderr
    );
    assert!(stderr.contains("pz doctor"), "{stderr}");
    assert!(stderr.contains("(missing)"), "{stderr}");
    assert!(stderr.contains("doctor: completed diagnostics."), "{stderr}");
}
