use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Run short-lived host helper processes (browser openers) with a timeout.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    /// Run to completion with null stdio; the child is killed when the timeout expires.
    pub fn run(&self, request: ExecRequest) -> Result<ExitStatus> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        // Never let a helper read from the terminal we are proxying, nor hold our output pipes.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        let timeout = self.default_timeout;
        if timeout.is_zero() {
            return child.wait().context("failed to wait for process");
        }
        match child
            .wait_timeout(timeout)
            .context("failed to wait with timeout")?
        {
            Some(status) => Ok(status),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(anyhow!(
                    "command {:?} timed out after {:?}",
                    request.program,
                    timeout
                ))
            }
        }
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_reports_exit_status() {
        let svc = ExecService::default();
        let status = svc
            .run(ExecRequest::new("sh").args(["-c", "exit 3"]))
            .expect("run sh");
        assert_eq!(status.code(), Some(3));
        let status = svc.run(ExecRequest::new("true")).expect("run true");
        assert!(status.success());
    }

    #[test]
    fn test_run_times_out() {
        let svc = ExecService::new(Duration::from_millis(200));
        let err = svc
            .run(ExecRequest::new("sh").args(["-c", "sleep 5"]))
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "err: {err}");
    }

    #[test]
    fn test_spawn_failure_has_context() {
        let svc = ExecService::default();
        let err = svc
            .run(ExecRequest::new("/definitely/not/a/real/binary"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to spawn"), "err: {err}");
    }
}
