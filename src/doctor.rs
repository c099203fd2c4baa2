use std::env;
use std::process::Command;

use which::which;

use crate::cli::Cli;
use crate::config::{config_path, load_config, LaunchSettings};
use crate::docker::runtime::container_runtime_path;
use crate::errors::LauncherError;
use crate::ipc::{browser_commands, pick_free_port};

pub fn build_info_line() -> String {
    format!(
        "build={} target={} profile={} rust={} ver={}",
        env!("PZ_BUILD_DATE"),
        env!("PZ_BUILD_TARGET"),
        env!("PZ_BUILD_PROFILE"),
        env!("PZ_BUILD_RUSTC"),
        env!("CARGO_PKG_VERSION")
    )
}

pub fn run_doctor(cli: &Cli) {
    eprintln!("pz doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  {}", build_info_line());
    eprintln!("  host:    {} / {}", env::consts::OS, env::consts::ARCH);
    eprintln!();

    match container_runtime_path() {
        Ok(p) => {
            eprintln!("  docker: {}", p.display());
            if let Ok(out) = Command::new(&p).arg("--version").output() {
                let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if !s.is_empty() {
                    eprintln!("  docker --version: {}", s);
                }
            }
        }
        Err(e) => eprintln!("  docker: not found ({e})"),
    }
    eprintln!();

    let path = config_path(cli.config.as_deref());
    match load_config(&path) {
        Ok(cfg) => {
            let s = LaunchSettings::from_env(&cfg, cli.image.as_deref(), cli.entrypoint.as_deref());
            eprintln!("  config: {}", path.display());
            eprintln!("  image: {}", s.image);
            eprintln!("  entrypoint: {}", s.entrypoint);
        }
        Err(LauncherError::ConfigMissing(p)) => {
            eprintln!("  config: {} (missing)", p.display());
        }
        Err(e) => eprintln!("  config: {e}"),
    }
    eprintln!();

    let browser_env = env::var("BROWSER").ok().filter(|s| !s.trim().is_empty());
    let opener = browser_commands(browser_env.as_deref(), env::consts::OS, "<url>")
        .into_iter()
        .find(|argv| which(&argv[0]).is_ok());
    match opener {
        Some(argv) => eprintln!("  browser opener: {}", argv[0]),
        None => eprintln!("  browser opener: none found (URL open requests will fail)"),
    }
    match pick_free_port() {
        Ok(p) => eprintln!("  ipc port sample: {p}"),
        Err(e) => eprintln!("  ipc port: {e}"),
    }

    eprintln!();
    eprintln!("doctor: completed diagnostics.");
}
