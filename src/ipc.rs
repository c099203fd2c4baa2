//! Host-side IPC responder for in-container tooling.
//!
//! In-container processes connect to `PZ_IPC_HOST:PZ_IPC_PORT` and call
//! `Launcher.OpenURL` to have the host open a URL in its default browser.

pub mod browser;
pub mod codec;
pub mod port;
pub mod server;
pub mod service;

pub use browser::{browser_commands, SystemBrowser, UrlOpener};
pub use codec::{read_frame, read_message, write_frame, write_message, RpcRequest, RpcResponse};
pub use port::{pick_free_port, RESERVED_PORT_MAX};
pub use server::{handle_connection, start_ipc_server, IpcServer};
pub use service::{CallError, LauncherService, OPEN_URL_METHOD, OPEN_URL_OK};

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use crate::errors::LauncherError;

/// Address the responder binds: all interfaces, so the container can reach it via the host gateway.
pub fn ipc_bind_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Start the responder on `port` with the system browser opener.
pub fn start_default_ipc_server(port: u16) -> Result<IpcServer, LauncherError> {
    let service = Arc::new(LauncherService::new(Arc::new(SystemBrowser::default())));
    start_ipc_server(ipc_bind_addr(port), service)
}
