use clap::Parser;
use std::path::PathBuf;

use crate::docker::Backend;
use crate::ipc::RESERVED_PORT_MAX;

/// Validate an explicit IPC port: must be above the reserved range.
fn parse_ipc_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid port number"))?;
    if port <= RESERVED_PORT_MAX {
        return Err(format!("port must be greater than {RESERVED_PORT_MAX}"));
    }
    Ok(port)
}

#[derive(Parser, Debug)]
#[command(
    name = "pz",
    version,
    about = "Start the project's toolchain container with the current directory mounted at /project.",
    override_usage = "pz [OPTIONS] [--] [COMMAND [ARGS]...]",
    after_long_help = "Examples:\n  pz composer install\n  pz --backend api bin/console cache:clear\n  pz --dry-run -- npm run build\n  pz --doctor\n"
)]
pub struct Cli {
    /// Override Docker image (full ref). Default: launcher_docker_image from .pz.yaml
    #[arg(long)]
    pub image: Option<String>,

    /// Override container entrypoint. Default: launcher_docker_entrypoint from .pz.yaml
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Project config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Container backend: cli (docker run) or api (Docker Engine API)
    #[arg(long, value_enum, default_value_t = Backend::Cli)]
    pub backend: Backend,

    /// Port for the host IPC responder (default: random free port above 1024)
    #[arg(long = "ipc-port", value_parser = parse_ipc_port)]
    pub ipc_port: Option<u16>,

    /// Print detailed execution info
    #[arg(long)]
    pub verbose: bool,

    /// Prepare and print what would run, but do not execute
    #[arg(long)]
    pub dry_run: bool,

    /// Run diagnostics to check environment and configuration
    #[arg(long)]
    pub doctor: bool,

    /// Command and arguments passed to the container
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_args_keep_hyphens() {
        let cli = Cli::try_parse_from(["pz", "--verbose", "composer", "install", "--no-dev"])
            .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.args, vec!["composer", "install", "--no-dev"]);
        assert_eq!(cli.backend, Backend::Cli);
    }

    #[test]
    fn test_double_dash_separates_container_args() {
        let cli = Cli::try_parse_from(["pz", "--backend", "api", "--", "--help"]).expect("parse");
        assert_eq!(cli.backend, Backend::Api);
        assert_eq!(cli.args, vec!["--help"]);
    }

    #[test]
    fn test_ipc_port_validation() {
        let cli = Cli::try_parse_from(["pz", "--ipc-port", "45666"]).expect("parse");
        assert_eq!(cli.ipc_port, Some(45666));
        assert!(Cli::try_parse_from(["pz", "--ipc-port", "80"]).is_err());
        assert!(Cli::try_parse_from(["pz", "--ipc-port", "x"]).is_err());
    }

    #[test]
    fn test_no_args_means_image_default_command() {
        let cli = Cli::try_parse_from(["pz"]).expect("parse");
        assert!(cli.args.is_empty());
        assert!(cli.config.is_none());
    }
}
