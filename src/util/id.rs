use std::time::{Duration, SystemTime};

/// Short, mostly-unique session id used to name launcher containers.
pub fn create_session_id() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let pid = std::process::id() as u128;
    let mix = now.as_nanos() ^ pid;
    // base36 encode last 40 bits for brevity
    let mut v = (mix & 0xffffffffff) as u64;
    let mut s = String::new();
    let alphabet = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if v == 0 {
        s.push('0');
    } else {
        while v > 0 {
            let idx = (v % 36) as usize;
            s.push(alphabet[idx] as char);
            v /= 36;
        }
    }
    s.chars().rev().collect()
}

/// Container name for a launcher session.
pub fn container_name(session_id: &str) -> String {
    format!("pz-{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_short_base36() {
        let id = create_session_id();
        assert!(!id.is_empty() && id.len() <= 8, "id: {id}");
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_container_name_prefix() {
        assert_eq!(container_name("abc123"), "pz-abc123");
    }
}
