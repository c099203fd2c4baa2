#![allow(clippy::module_name_repetitions)]
//! Project configuration (`./.pz.yaml`) loading and effective settings resolution.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::LauncherError;

/// Default config file, relative to the working directory.
pub const CONFIG_FILE: &str = "./.pz.yaml";
pub const DEFAULT_DOCKER_IMAGE: &str = "projectzer0/pz-launcher";
pub const DEFAULT_DOCKER_ENTRYPOINT: &str =
    "/project/vendor/project-zer0/pz/docker/docker-entrypoint.sh";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct LauncherSection {
    #[serde(default)]
    pub launcher_docker_image: Option<String>,
    #[serde(default)]
    pub launcher_docker_entrypoint: Option<String>,
}

/// Parsed `.pz.yaml`. Unknown keys are ignored; the toolchain inside the
/// container reads the same file for its own settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct PzConfig {
    #[serde(default)]
    pub project_zer0: Option<LauncherSection>,
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl PzConfig {
    pub fn parse(content: &str, origin: &Path) -> Result<Self, LauncherError> {
        if content.trim().is_empty() {
            return Ok(PzConfig::default());
        }
        let parsed: Option<PzConfig> = serde_yaml::from_str(content).map_err(|e| {
            LauncherError::Config(format!("cannot parse {}: {}", origin.display(), e))
        })?;
        Ok(parsed.unwrap_or_default())
    }

    fn section(&self) -> Option<&LauncherSection> {
        self.project_zer0.as_ref()
    }

    /// Image from the file, if set to a non-blank value.
    pub fn configured_image(&self) -> Option<&str> {
        non_blank(self.section().and_then(|s| s.launcher_docker_image.as_deref()))
    }

    pub fn configured_entrypoint(&self) -> Option<&str> {
        non_blank(
            self.section()
                .and_then(|s| s.launcher_docker_entrypoint.as_deref()),
        )
    }

    pub fn docker_image(&self) -> String {
        self.configured_image()
            .unwrap_or(DEFAULT_DOCKER_IMAGE)
            .to_string()
    }

    pub fn docker_entrypoint(&self) -> String {
        self.configured_entrypoint()
            .unwrap_or(DEFAULT_DOCKER_ENTRYPOINT)
            .to_string()
    }
}

/// Read and parse the config file; a missing file is reported as `ConfigMissing`.
pub fn load_config(path: &Path) -> Result<PzConfig, LauncherError> {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LauncherError::ConfigMissing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(LauncherError::Config(format!(
                "cannot read {}: {}",
                path.display(),
                e
            )));
        }
    };
    PzConfig::parse(&content, path)
}

/// Resolve the config path: explicit flag wins, otherwise `./.pz.yaml`.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Effective image/entrypoint after applying overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub image: String,
    pub entrypoint: String,
}

impl LaunchSettings {
    /// Precedence: CLI flag > environment > config file > default. Blank values are skipped.
    pub fn resolve(
        cfg: &PzConfig,
        cli_image: Option<&str>,
        cli_entrypoint: Option<&str>,
        env_image: Option<&str>,
        env_entrypoint: Option<&str>,
    ) -> Self {
        let image = non_blank(cli_image)
            .or(non_blank(env_image))
            .map(str::to_string)
            .unwrap_or_else(|| cfg.docker_image());
        let entrypoint = non_blank(cli_entrypoint)
            .or(non_blank(env_entrypoint))
            .map(str::to_string)
            .unwrap_or_else(|| cfg.docker_entrypoint());
        LaunchSettings { image, entrypoint }
    }

    /// Same as `resolve`, reading `PZ_LAUNCHER_IMAGE` / `PZ_LAUNCHER_ENTRYPOINT`.
    pub fn from_env(cfg: &PzConfig, cli_image: Option<&str>, cli_entrypoint: Option<&str>) -> Self {
        let env_image = env::var("PZ_LAUNCHER_IMAGE").ok();
        let env_entrypoint = env::var("PZ_LAUNCHER_ENTRYPOINT").ok();
        Self::resolve(
            cfg,
            cli_image,
            cli_entrypoint,
            env_image.as_deref(),
            env_entrypoint.as_deref(),
        )
    }
}
