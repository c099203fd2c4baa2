//! Raw-mode guard for the host terminal.

use std::io;

use crate::telemetry::set_raw_mode_active;

/// Puts stdin in raw mode; the previous mode is restored on drop.
pub struct RawTerminal {
    #[cfg(unix)]
    saved: nix::sys::termios::Termios,
}

#[cfg(unix)]
impl RawTerminal {
    pub fn enter() -> io::Result<Self> {
        use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg};

        let stdin = io::stdin();
        let saved = tcgetattr(&stdin)?;
        let mut raw = saved.clone();
        cfmakeraw(&mut raw);
        tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;
        set_raw_mode_active(true);
        Ok(RawTerminal { saved })
    }
}

#[cfg(not(unix))]
impl RawTerminal {
    pub fn enter() -> io::Result<Self> {
        set_raw_mode_active(true);
        Ok(RawTerminal {})
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::termios::{tcsetattr, SetArg};
            let _ = tcsetattr(&io::stdin(), SetArg::TCSANOW, &self.saved);
        }
        set_raw_mode_active(false);
    }
}
