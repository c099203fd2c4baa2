//! Error mapping guide:
//! - Map io::ErrorKind::NotFound to exit code 127; all others to 1.
//! - A missing config file is a one-line message and exit code 1.
//! - Container exit codes are forwarded as-is by the launcher, not through this module.
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Errors surfaced by the launcher to `main`.
#[derive(Debug)]
pub enum LauncherError {
    /// The project config file does not exist.
    ConfigMissing(PathBuf),
    /// The project config file exists but could not be read or parsed.
    Config(String),
    Io(io::Error),
    /// Docker Engine API failure.
    Docker(String),
    /// IPC responder failure (bind, accept setup).
    Ipc(String),
}

impl From<io::Error> for LauncherError {
    fn from(e: io::Error) -> Self {
        LauncherError::Io(e)
    }
}

impl From<bollard::errors::Error> for LauncherError {
    fn from(e: bollard::errors::Error) -> Self {
        LauncherError::Docker(e.to_string())
    }
}

impl fmt::Display for LauncherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LauncherError::ConfigMissing(p) => write!(f, "Missing \"{}\" file.", p.display()),
            LauncherError::Config(s) => write!(f, "{s}"),
            LauncherError::Io(e) => write!(f, "{e}"),
            LauncherError::Docker(s) => write!(f, "docker: {s}"),
            LauncherError::Ipc(s) => write!(f, "ipc: {s}"),
        }
    }
}

impl std::error::Error for LauncherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LauncherError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Convert LauncherError to exit code (parity with io::Error mapping).
pub fn exit_code_for_launcher_error(e: &LauncherError) -> u8 {
    match e {
        LauncherError::Io(ioe) => exit_code_for_io_error(ioe),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_not_found_is_127() {
        let e = io::Error::new(io::ErrorKind::NotFound, "docker missing");
        assert_eq!(exit_code_for_io_error(&e), 127);
        assert_eq!(exit_code_for_launcher_error(&LauncherError::Io(e)), 127);
    }

    #[test]
    fn test_exit_code_other_errors_are_1() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(exit_code_for_io_error(&e), 1);
        assert_eq!(
            exit_code_for_launcher_error(&LauncherError::ConfigMissing(PathBuf::from(
                "./.pz.yaml"
            ))),
            1
        );
        assert_eq!(
            exit_code_for_launcher_error(&LauncherError::Docker("boom".into())),
            1
        );
    }

    #[test]
    fn test_missing_config_message_is_one_line() {
        let e = LauncherError::ConfigMissing(PathBuf::from("./.pz.yaml"));
        let s = e.to_string();
        assert_eq!(s, "Missing \"./.pz.yaml\" file.");
        assert!(!s.contains('\n'));
    }
}
