#![allow(clippy::module_name_repetitions)]
//! Docker `run` command construction, preview rendering and execution.

use std::io;
use std::process::{Command, ExitStatus};

use tracing::debug;

use super::env::push_env_kv;
use super::runtime::container_runtime_path;
use super::{LaunchPlan, CONTAINER_WORKDIR};
use crate::util::shell_join;

/// Full argv for the launcher container, starting with `docker`.
pub fn build_docker_run_args(plan: &LaunchPlan) -> Vec<String> {
    let mut args: Vec<String> = vec!["docker".into(), "run".into(), "--rm".into()];

    // TTY flags: -t only when our stdin is a terminal, docker refuses otherwise
    if plan.tty {
        args.push("-it".into());
    } else {
        args.push("-i".into());
    }

    args.push("--name".into());
    args.push(plan.container_name.clone());
    args.push("--add-host".into());
    args.push(plan.extra_host());

    for (k, v) in plan.env_pairs() {
        push_env_kv(&mut args, &k, &v);
    }

    for bind in plan.binds() {
        args.push("-v".into());
        args.push(bind);
    }

    args.push("-w".into());
    args.push(CONTAINER_WORKDIR.into());
    args.push("--entrypoint".into());
    args.push(plan.entrypoint.clone());
    args.push(plan.image.clone());
    args.extend(plan.args.iter().cloned());
    args
}

/// Build the docker run command and return it with a shell-escaped preview string.
pub fn build_docker_cmd(plan: &LaunchPlan) -> io::Result<(Command, String)> {
    let runtime = container_runtime_path()?;
    let args = build_docker_run_args(plan);
    let preview = shell_join(&args);
    let mut cmd = Command::new(runtime);
    cmd.args(&args[1..]);
    Ok((cmd, preview))
}

/// Exit code to forward for a finished child; signals map to 128+N on Unix.
pub fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

/// Run the container through the Docker CLI with inherited stdio; returns its exit code.
pub fn run_docker_cli(plan: &LaunchPlan) -> io::Result<i32> {
    let (mut cmd, preview) = build_docker_cmd(plan)?;
    debug!("docker: {preview}");
    let status = cmd.status()?;
    let code = exit_code_from_status(status);
    debug!(code, "docker run finished");
    Ok(code)
}
