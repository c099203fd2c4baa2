//! Free TCP port selection above the reserved range.

use std::io;
use std::net::TcpListener;

/// Highest reserved (privileged) port; picked ports are strictly above it.
pub const RESERVED_PORT_MAX: u16 = 1024;
pub const PICK_ATTEMPTS: usize = 64;

fn random_u32() -> io::Result<u32> {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(u32::from_le_bytes(buf))
}

/// Map a random value onto 1025..=65535.
pub fn port_from_random(v: u32) -> u16 {
    let span = u32::from(u16::MAX - RESERVED_PORT_MAX);
    (u32::from(RESERVED_PORT_MAX) + 1 + v % span) as u16
}

pub fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}

/// Try up to `attempts` candidates from `next` and return the first bindable one.
pub fn pick_free_port_with<F, P>(mut next: F, is_free: P, attempts: usize) -> io::Result<u16>
where
    F: FnMut() -> io::Result<u32>,
    P: Fn(u16) -> bool,
{
    for _ in 0..attempts {
        let port = port_from_random(next()?);
        if is_free(port) {
            return Ok(port);
        }
        tracing::debug!(port, "ipc port candidate busy");
    }
    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free port found above {RESERVED_PORT_MAX} after {attempts} attempts"),
    ))
}

pub fn pick_free_port() -> io::Result<u16> {
    pick_free_port_with(random_u32, port_is_free, PICK_ATTEMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_from_random_stays_above_reserved() {
        assert_eq!(port_from_random(0), 1025);
        assert_eq!(port_from_random(64510), 65535);
        assert_eq!(port_from_random(64511), 1025);
        assert_eq!(port_from_random(u32::MAX), 1025 + (u32::MAX % 64511) as u16);
    }

    #[test]
    fn test_pick_skips_busy_candidates() {
        let mut seq = vec![10u32, 20, 30].into_iter();
        let port = pick_free_port_with(
            || Ok(seq.next().unwrap_or(0)),
            |p| p == port_from_random(30),
            5,
        )
        .expect("port");
        assert_eq!(port, 1055);
    }

    #[test]
    fn test_pick_gives_up_after_attempts() {
        let err = pick_free_port_with(|| Ok(1), |_| false, 3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[test]
    fn test_pick_free_port_real_socket() {
        let port = pick_free_port().expect("free port");
        assert!(port > RESERVED_PORT_MAX);
    }

    #[test]
    fn test_random_u32_draws_from_os() {
        let draws: Vec<u32> = (0..4).map(|_| random_u32().expect("entropy")).collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]), "draws: {draws:?}");
    }
}
