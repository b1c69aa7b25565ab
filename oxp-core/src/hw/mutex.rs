//! Platform lock shared with firmware
//!
//! EC writes race with system firmware, so every write happens while holding
//! a lock that is not owned by this process alone. Starvation and backend
//! failures are expected outcomes here, not bugs.
//!
//! The production backend is an advisory `flock(2)` on a well-known lock
//! file. Each acquisition opens its own file description, so two threads of
//! the same process exclude each other just like two processes do.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use oxp_error::{OxpError, Result};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::constants::lock::POLL_INTERVAL;

/// Proof of a successful acquisition. Must be handed back to `release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u32);

impl Token {
    pub fn new(handle: u32) -> Self {
        Self(handle)
    }

    pub fn handle(self) -> u32 {
        self.0
    }
}

/// Bounded-wait lock shared with an external agent.
#[cfg_attr(test, mockall::automock)]
pub trait HardwareMutex {
    /// Wait at most `timeout` for the lock. `OxpError::Busy` on timeout.
    fn acquire(&self, timeout: Duration) -> Result<Token>;

    /// Release a lock previously returned by `acquire`.
    fn release(&self, token: Token) -> Result<()>;
}

/// `flock(2)` based platform lock.
#[derive(Debug)]
pub struct FlockMutex {
    path: PathBuf,
    next_handle: AtomicU32,
    held: Mutex<HashMap<u32, File>>,
}

impl FlockMutex {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            next_handle: AtomicU32::new(1),
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock_file(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| {
                OxpError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to open lock file {}: {}", self.path.display(), e),
                ))
            })
    }
}

fn try_flock(file: &File, op: libc::c_int) -> io::Result<bool> {
    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), op) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EWOULDBLOCK) | Some(libc::EINTR) => Ok(false),
        _ => Err(err),
    }
}

impl HardwareMutex for FlockMutex {
    fn acquire(&self, timeout: Duration) -> Result<Token> {
        let file = self.open_lock_file()?;
        let deadline = Instant::now() + timeout;

        loop {
            if try_flock(&file, libc::LOCK_EX | libc::LOCK_NB)? {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Platform lock {} still contended after {:?}", self.path.display(), timeout);
                return Err(OxpError::Busy {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }

        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.held.lock().insert(handle, file);
        trace!("Platform lock acquired, handle {}", handle);
        Ok(Token(handle))
    }

    fn release(&self, token: Token) -> Result<()> {
        let file = self
            .held
            .lock()
            .remove(&token.0)
            .ok_or_else(|| OxpError::MutexRelease(format!("unknown handle {}", token.0)))?;

        try_flock(&file, libc::LOCK_UN)
            .map_err(|e| OxpError::MutexRelease(e.to_string()))
            .and_then(|unlocked| {
                if unlocked {
                    trace!("Platform lock released, handle {}", token.0);
                    Ok(())
                } else {
                    Err(OxpError::MutexRelease("unlock interrupted".into()))
                }
            })
    }
}
