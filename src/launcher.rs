//! Top-level launch flow: config, settings, IPC responder, backend, exit status.

use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::{config_path, load_config, LaunchSettings};
use crate::docker::engine::run_engine;
use crate::docker::run::{build_docker_run_args, run_docker_cli};
use crate::docker::{prepare_host_dirs, Backend, LaunchPlan};
use crate::errors::LauncherError;
use crate::ipc::{pick_free_port, start_default_ipc_server};
use crate::util::id::{container_name, create_session_id};
use crate::util::shell_join;

/// Canonicalized working directory (falls back to the raw path).
pub fn project_dir() -> PathBuf {
    let p = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    fs::canonicalize(&p).unwrap_or(p)
}

/// Load config and resolve everything the backends need, without side effects.
pub fn prepare_plan(cli: &Cli) -> Result<(LaunchSettings, LaunchPlan), LauncherError> {
    let path = config_path(cli.config.as_deref());
    let cfg = load_config(&path)?;
    let settings = LaunchSettings::from_env(&cfg, cli.image.as_deref(), cli.entrypoint.as_deref());

    let ipc_port = match cli.ipc_port {
        Some(p) => p,
        None => pick_free_port()?,
    };

    let plan = LaunchPlan {
        image: settings.image.clone(),
        entrypoint: settings.entrypoint.clone(),
        args: cli.args.clone(),
        project_dir: project_dir(),
        ipc_port,
        container_name: container_name(&create_session_id()),
        tty: atty::is(atty::Stream::Stdin),
    };
    Ok((settings, plan))
}

/// Run the launcher and return the exit code to forward.
pub fn run(cli: &Cli) -> Result<i32, LauncherError> {
    let (settings, plan) = prepare_plan(cli)?;

    if cli.verbose || cli.dry_run {
        eprintln!("pz: image: {}", settings.image);
        eprintln!("pz: entrypoint: {}", settings.entrypoint);
        eprintln!("pz: backend: {:?}", cli.backend);
        eprintln!("pz: ipc port: {}", plan.ipc_port);
        eprintln!("pz: docker: {}", shell_join(&build_docker_run_args(&plan)));
    }
    if cli.dry_run {
        eprintln!("pz: dry-run requested; not executing Docker.");
        return Ok(0);
    }

    prepare_host_dirs(&plan);
    let server = start_default_ipc_server(plan.ipc_port)?;
    debug!(port = server.port(), "ipc responder ready");

    let result = match cli.backend {
        Backend::Cli => run_docker_cli(&plan).map_err(LauncherError::from),
        Backend::Api => run_engine(&plan),
    };

    server.stop();
    if let Ok(code) = &result {
        info!(code, "launcher container exited");
    }
    result
}

/// Clamp a forwarded exit code into the process exit-status byte.
pub fn exit_status_byte(code: i32) -> u8 {
    (code & 0xff) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_exit_status_byte() {
        assert_eq!(exit_status_byte(0), 0);
        assert_eq!(exit_status_byte(2), 2);
        assert_eq!(exit_status_byte(130), 130);
        assert_eq!(exit_status_byte(256), 0);
        assert_eq!(exit_status_byte(-1), 255);
    }

    #[test]
    fn test_prepare_plan_reports_missing_config() {
        let td = tempfile::tempdir().expect("tmpdir");
        let missing = td.path().join(".pz.yaml");
        let cli = Cli::try_parse_from([
            "pz",
            "--config",
            missing.to_str().expect("utf8"),
            "--ipc-port",
            "45666",
        ])
        .expect("parse");
        match prepare_plan(&cli) {
            Err(LauncherError::ConfigMissing(p)) => assert_eq!(p, missing),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_prepare_plan_uses_config_and_args() {
        let td = tempfile::tempdir().expect("tmpdir");
        let cfg = td.path().join(".pz.yaml");
        fs::write(
            &cfg,
            "project_zer0:\n  launcher_docker_image: acme/pz:3\n",
        )
        .expect("write cfg");
        let cli = Cli::try_parse_from([
            "pz",
            "--config",
            cfg.to_str().expect("utf8"),
            "--ipc-port",
            "45666",
            "--entrypoint",
            "/e.sh",
            "make",
            "test",
        ])
        .expect("parse");
        let (settings, plan) = prepare_plan(&cli).expect("plan");
        assert_eq!(settings.entrypoint, "/e.sh");
        assert_eq!(plan.ipc_port, 45666);
        assert_eq!(plan.args, vec!["make", "test"]);
        assert!(plan.container_name.starts_with("pz-"));
        if env::var("PZ_LAUNCHER_IMAGE").is_err() {
            assert_eq!(plan.image, "acme/pz:3");
        }
    }
}
