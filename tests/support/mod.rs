/*!
Test support helpers shared across integration tests.

- rpc_call(stream, id, method, params): one framed request/response round
- RecordingOpener: UrlOpener that records URLs instead of launching a browser
- write_pz_yaml(dir, body): create a project config in a scratch directory
*/

use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pz_launcher::ipc::{read_message, write_message, RpcRequest, RpcResponse};
use pz_launcher::UrlOpener;

/// Send one request and read one response. `Ok(None)` when the server closed the connection.
#[allow(dead_code)]
pub fn rpc_call(
    stream: &mut TcpStream,
    id: u64,
    method: &str,
    params: &str,
) -> io::Result<Option<RpcResponse>> {
    let req = RpcRequest {
        id,
        method: method.to_string(),
        params: params.to_string(),
    };
    write_message(stream, &req)?;
    read_message(stream)
}

#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingOpener {
    pub urls: Mutex<Vec<String>>,
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        self.urls
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(url.to_string());
        Ok(())
    }
}

#[allow(dead_code)]
pub fn write_pz_yaml(dir: &Path, body: &str) -> PathBuf {
    let p = dir.join(".pz.yaml");
    std::fs::write(&p, body).expect("write .pz.yaml");
    p
}
