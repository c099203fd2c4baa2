#![allow(clippy::module_name_repetitions)]
//! Launcher container orchestration.
//!
//! Two backends share one `LaunchPlan`:
//! - `run`: delegate to `docker run` (the Docker CLI owns lifecycle and signals)
//! - `engine`: drive the Docker Engine API directly (create/pull, attach, raw terminal, wait)

pub mod engine;
pub mod env;
pub mod run;
pub mod runtime;
pub mod terminal;

use std::fs;
use std::path::{Path, PathBuf};

pub const CONTAINER_WORKDIR: &str = "/project";
pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";
/// Hostname the container uses to reach the IPC responder.
pub const IPC_HOST_ALIAS: &str = "host.docker.internal";

/// Which orchestration backend to use.
#[derive(Copy, Clone, PartialEq, Eq, Debug, clap::ValueEnum)]
pub enum Backend {
    /// Delegate to `docker run`
    Cli,
    /// Talk to the Docker Engine API directly
    Api,
}

/// Everything needed to start the launcher container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub image: String,
    pub entrypoint: String,
    /// Command for the container (everything after the launcher's own options).
    pub args: Vec<String>,
    pub project_dir: PathBuf,
    pub ipc_port: u16,
    pub container_name: String,
    /// Allocate a TTY and put the host terminal in raw mode.
    pub tty: bool,
}

impl LaunchPlan {
    /// `KEY=VALUE` environment for the container, launcher variables first.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("PZ_PWD".to_string(), self.project_dir.display().to_string()),
            ("PZ_IPC_PORT".to_string(), self.ipc_port.to_string()),
            ("PZ_IPC_HOST".to_string(), IPC_HOST_ALIAS.to_string()),
        ];
        out.extend(env::passthrough_env());
        out
    }

    pub fn env_strings(&self) -> Vec<String> {
        self.env_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }

    /// Host directory mounted as the container's docker config dir.
    pub fn docker_config_dir(&self) -> PathBuf {
        self.project_dir.join(".pz").join(".docker")
    }

    /// Bind mounts in `src:dst` form.
    pub fn binds(&self) -> Vec<String> {
        vec![
            path_pair(&self.project_dir, CONTAINER_WORKDIR),
            path_pair(&self.docker_config_dir(), "/root/.docker"),
            format!("{DOCKER_SOCKET}:{DOCKER_SOCKET}"),
        ]
    }

    /// `--add-host` value mapping the IPC alias to the host gateway.
    pub fn extra_host(&self) -> String {
        format!("{IPC_HOST_ALIAS}:host-gateway")
    }
}

fn path_pair(host: &Path, container: &str) -> String {
    format!("{}:{}", host.display(), container)
}

/// Best-effort creation of bind-mount sources so Docker does not create them root-owned.
pub fn prepare_host_dirs(plan: &LaunchPlan) {
    let dir = plan.docker_config_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        tracing::warn!("cannot create {}: {e}", dir.display());
    }
}
