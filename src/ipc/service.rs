//! The methods exposed to in-container tooling.

use serde::Deserialize;
use std::sync::Arc;

use super::browser::UrlOpener;

pub const OPEN_URL_METHOD: &str = "Launcher.OpenURL";
pub const OPEN_URL_OK: &str = r#"{"status":"ok"}"#;

#[derive(Debug, Deserialize)]
struct OpenUrlPayload {
    url: String,
}

/// Outcome of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Reported to the caller; the connection stays usable.
    Failed(String),
    /// Reported to the caller, then the connection is closed.
    Fatal(String),
}

impl CallError {
    pub fn message(&self) -> &str {
        match self {
            CallError::Failed(m) | CallError::Fatal(m) => m,
        }
    }
}

pub struct LauncherService {
    opener: Arc<dyn UrlOpener>,
}

impl LauncherService {
    pub fn new(opener: Arc<dyn UrlOpener>) -> Self {
        LauncherService { opener }
    }

    pub fn call(&self, method: &str, params: &str) -> Result<String, CallError> {
        match method {
            OPEN_URL_METHOD => self.open_url(params),
            other => Err(CallError::Failed(format!(
                "rpc: can't find method {other}"
            ))),
        }
    }

    /// `{"url": "..."}` in, `{"status":"ok"}` out.
    pub fn open_url(&self, payload: &str) -> Result<String, CallError> {
        let packet: OpenUrlPayload = serde_json::from_str(payload)
            .map_err(|e| CallError::Fatal(format!("invalid payload: {e}")))?;
        let parsed = url::Url::parse(packet.url.trim())
            .map_err(|e| CallError::Failed(format!("invalid url '{}': {}", packet.url, e)))?;
        tracing::info!(url = %parsed, "open url requested");
        self.opener
            .open(parsed.as_str())
            .map_err(|e| CallError::Failed(format!("open url failed: {e:#}")))?;
        Ok(OPEN_URL_OK.to_string())
    }
}
