/*!
Host browser opener.

Resolution order:
- `BROWSER` (colon-separated list of commands; `%s` is replaced by the URL, otherwise the URL is appended)
- macOS: `open`
- Windows: `rundll32 url.dll,FileProtocolHandler`
- other Unix: `xdg-open`, `wslview`, `x-www-browser`, `www-browser`
*/
use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;
use which::which;

use crate::util::exec::{ExecRequest, ExecService};
use crate::util::shell_like_split_args;

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can show a URL to the user on the host.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Candidate argv lists, in preference order, for the given `BROWSER` value and target OS.
pub fn browser_commands(browser_env: Option<&str>, os: &str, url: &str) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = Vec::new();
    if let Some(spec) = browser_env {
        for entry in spec.split(':') {
            let mut words = shell_like_split_args(entry);
            if words.is_empty() {
                continue;
            }
            if words.iter().any(|w| w.contains("%s")) {
                for w in words.iter_mut() {
                    *w = w.replace("%s", url);
                }
            } else {
                words.push(url.to_string());
            }
            out.push(words);
        }
    }
    let platform: &[&[&str]] = match os {
        "macos" => &[&["open"]],
        "windows" => &[&["rundll32", "url.dll,FileProtocolHandler"]],
        _ => &[&["xdg-open"], &["wslview"], &["x-www-browser"], &["www-browser"]],
    };
    for argv in platform {
        let mut words: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        words.push(url.to_string());
        out.push(words);
    }
    out
}

/// Opens URLs with the host's default browser.
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    exec: ExecService,
}

impl Default for SystemBrowser {
    fn default() -> Self {
        SystemBrowser {
            exec: ExecService::new(OPEN_TIMEOUT),
        }
    }
}

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let browser_env = env::var("BROWSER").ok().filter(|s| !s.trim().is_empty());
        let candidates = browser_commands(browser_env.as_deref(), env::consts::OS, url);
        let argv = candidates
            .into_iter()
            .find(|argv| which(&argv[0]).is_ok())
            .ok_or_else(|| anyhow!("no browser opener found on PATH"))?;
        tracing::debug!(program = %argv[0], "opening url in host browser");
        let status = self
            .exec
            .run(ExecRequest::new(&argv[0]).args(&argv[1..]))?;
        if status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "browser opener '{}' exited with {}",
                argv[0],
                status
            ))
        }
    }
}
