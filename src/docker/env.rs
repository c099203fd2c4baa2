#![allow(clippy::module_name_repetitions)]
//! Container environment: fixed launcher variables plus host pass-through.

use once_cell::sync::Lazy;
use std::env;

// Pass-through environment variables to the launcher container
pub(crate) static PASS_ENV_VARS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Terminal capabilities for the attached session
        "TERM",
        "COLORTERM",
        // Timezone and locale
        "TZ",
        "LANG",
        "LC_ALL",
    ]
});

/// `KEY=VALUE` pairs for pass-through variables set (and non-empty) on the host.
pub(crate) fn passthrough_env() -> Vec<(String, String)> {
    PASS_ENV_VARS
        .iter()
        .filter_map(|k| match env::var(k) {
            Ok(v) if !v.is_empty() => Some((k.to_string(), v)),
            _ => None,
        })
        .collect()
}

pub(crate) fn push_env_kv(args: &mut Vec<String>, key: &str, val: &str) {
    args.push("-e".to_string());
    args.push(format!("{key}={val}"));
}
