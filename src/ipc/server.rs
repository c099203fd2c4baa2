/*!
IPC responder: listener setup, cooperative accept loop, per-connection dispatch.

- Listener is non-blocking; the loop checks the running flag between accept attempts
  and sleeps one poll interval when nothing is pending, so `stop()` takes effect
  within one interval.
- Each connection is served on its own thread: sequential request/response frames
  until the peer closes, a framing error occurs, or a call fails fatally.
*/
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::codec::{read_frame, write_message, RpcRequest, RpcResponse};
use super::service::{CallError, LauncherService};
use crate::errors::LauncherError;

pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to a running responder. Dropping it stops the accept loop.
pub struct IpcServer {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IpcServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Signal the accept loop to exit and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Bind `bind` and start serving `service` on a background thread.
pub fn start_ipc_server(
    bind: SocketAddr,
    service: Arc<LauncherService>,
) -> Result<IpcServer, LauncherError> {
    let listener = TcpListener::bind(bind)
        .map_err(|e| LauncherError::Ipc(format!("bind {bind} failed: {e}")))?;
    let addr = listener
        .local_addr()
        .map_err(|e| LauncherError::Ipc(format!("local addr failed: {e}")))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| LauncherError::Ipc(format!("set_nonblocking failed: {e}")))?;

    let running = Arc::new(AtomicBool::new(true));
    let running_cl = running.clone();
    let handle = std::thread::Builder::new()
        .name("pz-ipc-accept".to_string())
        .spawn(move || {
            info!(%addr, "ipc responder listening");
            accept_loop(&listener, &running_cl, &service);
            info!("ipc responder stopped");
        })
        .map_err(|e| LauncherError::Ipc(format!("spawn accept thread failed: {e}")))?;

    Ok(IpcServer {
        addr,
        running,
        handle: Some(handle),
    })
}

fn accept_loop(listener: &TcpListener, running: &AtomicBool, service: &Arc<LauncherService>) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let (stream, peer) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) => {
                if e.kind() != io::ErrorKind::WouldBlock {
                    warn!("ipc accept error: {e}");
                }
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
        };
        // Accepted sockets may inherit O_NONBLOCK on some platforms.
        let _ = stream.set_nonblocking(false);
        debug!(%peer, "ipc connection accepted");
        let svc = service.clone();
        std::thread::spawn(move || {
            let mut s = stream;
            handle_connection(&svc, &mut s);
            debug!(%peer, "ipc connection closed");
        });
    }
}

/// Serve calls on one connection until EOF, a framing error, or a fatal call error.
pub fn handle_connection<S: Read + Write>(service: &LauncherService, stream: &mut S) {
    loop {
        let frame = match read_frame(stream) {
            Ok(Some(f)) => f,
            Ok(None) => return,
            Err(e) => {
                debug!("ipc read error: {e}");
                return;
            }
        };
        let req: RpcRequest = match serde_json::from_slice(&frame) {
            Ok(r) => r,
            Err(e) => {
                warn!("ipc malformed request: {e}");
                let _ = write_message(stream, &RpcResponse::err(0, format!("malformed request: {e}")));
                return;
            }
        };
        debug!(id = req.id, method = %req.method, "ipc call");
        let (resp, close) = match service.call(&req.method, &req.params) {
            Ok(result) => (RpcResponse::ok(req.id, result), false),
            Err(CallError::Failed(msg)) => {
                warn!(method = %req.method, "ipc call failed: {msg}");
                (RpcResponse::err(req.id, msg), false)
            }
            Err(CallError::Fatal(msg)) => {
                warn!(method = %req.method, "ipc call aborted: {msg}");
                (RpcResponse::err(req.id, msg), true)
            }
        };
        if let Err(e) = write_message(stream, &resp) {
            debug!("ipc write error: {e}");
            return;
        }
        if close {
            return;
        }
    }
}
