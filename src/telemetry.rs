//! Diagnostics logging setup (tracing subscriber on stderr).
//!
//! While the terminal is in raw mode a bare `\n` does not return the cursor,
//! so the stderr writer rewrites line endings to `\r\n` for as long as
//! `set_raw_mode_active(true)` is in effect.

use std::env;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();
static RAW_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_raw_mode_active(active: bool) {
    RAW_MODE.store(active, Ordering::SeqCst);
}

pub fn raw_mode_active() -> bool {
    RAW_MODE.load(Ordering::SeqCst)
}

/// Rewrite `\n` to `\r\n` (leaving existing `\r\n` alone).
pub fn crlf(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() + 8);
    let mut prev = 0u8;
    for &b in buf {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

struct TermStderr;

impl Write for TermStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        if raw_mode_active() {
            err.write_all(&crlf(buf))?;
        } else {
            err.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "pz_launcher=debug,pz=debug"
    } else {
        "warn"
    }
}

/// Build the filter: `PZ_LOG` wins when set and valid, otherwise `--verbose` decides.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(spec) = env::var("PZ_LOG") {
        if !spec.trim().is_empty() {
            if let Ok(f) = EnvFilter::try_new(spec.trim()) {
                return f;
            }
            eprintln!("pz: ignoring invalid PZ_LOG value: {spec}");
        }
    }
    EnvFilter::new(default_directive(verbose))
}

/// Install the global subscriber once. Later calls are no-ops.
pub fn telemetry_init(verbose: bool) {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(build_filter(verbose))
            .with_writer(|| TermStderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_by_verbosity() {
        assert_eq!(default_directive(false), "warn");
        assert!(default_directive(true).contains("pz_launcher=debug"));
    }

    #[test]
    fn test_crlf_rewrites_bare_newlines_only() {
        assert_eq!(crlf(b"a\nb\n"), b"a\r\nb\r\n".to_vec());
        assert_eq!(crlf(b"a\r\nb"), b"a\r\nb".to_vec());
        assert_eq!(crlf(b"no newline"), b"no newline".to_vec());
    }

    #[test]
    fn test_init_is_idempotent() {
        telemetry_init(false);
        telemetry_init(true);
    }
}
