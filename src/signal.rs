//! Cooperative handling of the user's interrupt request (SIGINT).
//!
//! The OS-level handler only writes a byte into a socket pair. Input adapters
//! poll the read end next to their input so a blocked wait for a line wakes up
//! at once, and drain it before each read so an interrupt delivered while a
//! child was running is discarded instead of ending the shell.

use signal_hook::consts::SIGINT;
use std::io::{self, ErrorKind, Read};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;

/// Read end of the pipe that SIGINT notifications arrive on.
#[derive(Debug)]
pub struct Interrupt {
    read: UnixStream,
}

impl Interrupt {
    /// Register the SIGINT handler for this process.
    ///
    /// Children get the default disposition back when they exec, so Ctrl-C
    /// during a command only terminates that command.
    pub fn install() -> io::Result<Self> {
        let (interrupt, write) = Self::pipe()?;
        signal_hook::low_level::pipe::register(SIGINT, write)?;
        Ok(interrupt)
    }

    /// An interrupt pipe that is not attached to any signal; writing to the
    /// returned stream raises it.
    pub(crate) fn pipe() -> io::Result<(Self, UnixStream)> {
        let (read, write) = UnixStream::pair()?;
        read.set_nonblocking(true)?;
        Ok((Self { read }, write))
    }

    /// Returns whether an interrupt arrived since the last call, and clears it.
    pub fn take(&self) -> bool {
        let mut pending = false;
        let mut buf = [0u8; 64];
        loop {
            match (&self.read).read(&mut buf) {
                Ok(0) => return pending,
                Ok(_) => pending = true,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return pending,
            }
        }
    }
}

impl AsFd for Interrupt {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.read.as_fd()
    }
}
