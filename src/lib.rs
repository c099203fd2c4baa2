//! pz launcher library: project config, host IPC responder and launcher container orchestration.
//!
//! Public APIs are re-exported at the crate root; `main.rs` wires them together.

pub mod cli;
pub mod config;
pub mod docker;
pub mod doctor;
pub mod errors;
pub mod ipc;
pub mod launcher;
pub mod telemetry;
pub mod util;

pub use config::{
    config_path, load_config, LaunchSettings, PzConfig, CONFIG_FILE, DEFAULT_DOCKER_ENTRYPOINT,
    DEFAULT_DOCKER_IMAGE,
};
pub use docker::engine::run_engine;
pub use docker::run::{build_docker_cmd, build_docker_run_args, run_docker_cli};
pub use docker::runtime::container_runtime_path;
pub use docker::{Backend, LaunchPlan};
pub use errors::{exit_code_for_io_error, exit_code_for_launcher_error, LauncherError};
pub use ipc::{
    pick_free_port, start_ipc_server, IpcServer, LauncherService, SystemBrowser, UrlOpener,
    OPEN_URL_METHOD, OPEN_URL_OK,
};
pub use telemetry::telemetry_init;
pub use util::{shell_escape, shell_join};
