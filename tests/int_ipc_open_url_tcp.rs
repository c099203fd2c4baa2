mod support;

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pz_launcher::{start_ipc_server, LauncherService, OPEN_URL_METHOD};
use support::{rpc_call, RecordingOpener};

fn start() -> (pz_launcher::IpcServer, Arc<RecordingOpener>, SocketAddr) {
    let rec = Arc::new(RecordingOpener::default());
    let svc = Arc::new(LauncherService::new(rec.clone()));
    let server = start_ipc_server("127.0.0.1:0".parse().expect("addr"), svc).expect("start ipc");
    let addr = server.local_addr();
    (server, rec, addr)
}

#[test]
fn test_open_url_over_tcp_replies_status_ok() {
    let (server, rec, addr) = start();
    let mut s = TcpStream::connect(addr).expect("connect");
    s.set_read_timeout(Some(Duration::from_secs(5))).ok();

    let resp = rpc_call(&mut s, 1, OPEN_URL_METHOD, r#"{"url":"http://localhost:8000/login"}"#)
        .expect("call")
        .expect("response");
    assert_eq!(resp.id, 1);
    assert_eq!(resp.result.as_deref(), Some(r#"{"status":"ok"}"#));
    assert!(resp.error.is_none());

    // Same connection serves further calls
    let resp = rpc_call(&mut s, 2, OPEN_URL_METHOD, r#"{"url":"https://example.org/"}"#)
        .expect("call 2")
        .expect("response 2");
    assert_eq!(resp.id, 2);
    assert_eq!(resp.result.as_deref(), Some(r#"{"status":"ok"}"#));

    assert_eq!(
        rec.urls.lock().expect("lock").clone(),
        vec![
            "http://localhost:8000/login".to_string(),
            "https://example.org/".to_string()
        ]
    );
    server.stop();
}

#[test]
fn test_malformed_payload_fails_call_and_closes_connection() {
    let (server, rec, addr) = start();
    let mut s = TcpStream::connect(addr).expect("connect");
    s.set_read_timeout(Some(Duration::from_secs(5))).ok();

    let resp = rpc_call(&mut s, 7, OPEN_URL_METHOD, "{\"url\":")
        .expect("call")
        .expect("error response");
    assert_eq!(resp.id, 7);
    assert!(resp.result.is_none());
    assert!(resp.error.is_some());

    // The server hangs up after a fatal call
    let mut rest = Vec::new();
    let n = s.read_to_end(&mut rest).unwrap_or(0);
    assert_eq!(n, 0, "expected EOF, got {} bytes", n);
    assert!(rec.urls.lock().expect("lock").is_empty());

    // Other connections are unaffected
    let mut s2 = TcpStream::connect(addr).expect("connect 2");
    s2.set_read_timeout(Some(Duration::from_secs(5))).ok();
    let resp = rpc_call(&mut s2, 8, OPEN_URL_METHOD, r#"{"url":"http://localhost/"}"#)
        .expect("call")
        .expect("response");
    assert_eq!(resp.result.as_deref(), Some(r#"{"status":"ok"}"#));
    server.stop();
}

#[test]
fn test_stop_closes_listener_promptly() {
    let (server, _rec, addr) = start();
    let started = Instant::now();
    server.stop();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "stop took {:?}",
        started.elapsed()
    );
    assert!(TcpStream::connect_timeout(&addr, Duration::from_millis(500)).is_err());
}
