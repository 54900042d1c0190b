use super::TerminalSize;

/// Probes `$COLUMNS`, then the window size of whichever standard stream
/// (or the controlling tty) is attached to a terminal.
pub struct TerminalProbe;

impl TerminalSize for TerminalProbe {
    fn columns(&self) -> Option<u16> {
        if let Some(cols) = columns_from_env(std::env::var("COLUMNS").ok().as_deref()) {
            return Some(cols);
        }
        ioctl_columns()
    }
}

/// Parse a `$COLUMNS` value. Zero and garbage count as unset.
fn columns_from_env(value: Option<&str>) -> Option<u16> {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|w| *w > 0)
}

#[cfg(unix)]
fn ioctl_columns() -> Option<u16> {
    use std::os::unix::io::AsRawFd;

    for fd in [libc::STDERR_FILENO, libc::STDOUT_FILENO, libc::STDIN_FILENO] {
        if let Some(cols) = window_columns(fd) {
            return Some(cols);
        }
    }

    // The host pipes all three streams; the controlling tty may still answer.
    let tty = std::fs::File::open("/dev/tty").ok()?;
    window_columns(tty.as_raw_fd())
}

#[cfg(unix)]
fn window_columns(fd: libc::c_int) -> Option<u16> {
    // SAFETY: `winsize` is plain old data, so an all-zero value is valid.
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ writes at most one `winsize` into the pointer we
    // pass, which points at a live stack value. A bad fd just fails.
    let rc = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size as *mut libc::winsize) };
    (rc == 0 && size.ws_col > 0).then_some(size.ws_col)
}

#[cfg(not(unix))]
fn ioctl_columns() -> Option<u16> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_from_env() {
        assert_eq!(columns_from_env(Some("120")), Some(120));
        assert_eq!(columns_from_env(Some(" 90 ")), Some(90));
        assert_eq!(columns_from_env(Some("0")), None);
        assert_eq!(columns_from_env(Some("wide")), None);
        assert_eq!(columns_from_env(None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_window_columns_bad_fd() {
        assert_eq!(window_columns(-1), None);
    }
}
