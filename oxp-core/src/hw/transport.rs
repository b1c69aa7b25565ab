//! Register transport
//!
//! Multi-byte reads and lock-guarded single-byte writes on top of an
//! [`EcBus`]. Reads never take the platform lock; writes always do.

use std::time::Duration;

use oxp_error::{OxpError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ec::EcBus;
use super::mutex::HardwareMutex;
use crate::constants::lock::ACQUIRE_TIMEOUT;

/// Number of consecutive registers making up one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteWidth {
    One,
    Two,
}

impl ByteWidth {
    pub const fn bytes(self) -> u8 {
        match self {
            ByteWidth::One => 1,
            ByteWidth::Two => 2,
        }
    }
}

/// EC access with the platform lock around every write.
#[derive(Debug)]
pub struct RegisterTransport<B, M> {
    bus: B,
    mutex: M,
    lock_timeout: Duration,
}

impl<B: EcBus, M: HardwareMutex> RegisterTransport<B, M> {
    pub fn new(bus: B, mutex: M) -> Self {
        Self {
            bus,
            mutex,
            lock_timeout: ACQUIRE_TIMEOUT,
        }
    }

    /// Override the acquire timeout (tests and slow firmware).
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Read `width` registers starting at `register`, least significant byte
    /// first.
    pub fn read_register(&self, register: u8, width: ByteWidth) -> Result<u32> {
        let count = width.bytes();
        if register.checked_add(count - 1).is_none() {
            return Err(OxpError::invalid(format!(
                "{}-byte read at 0x{:02X} runs past the last register",
                count, register
            )));
        }

        let mut value = 0u32;
        for i in 0..count {
            let byte = self.bus.read_byte(register + i)?;
            value |= u32::from(byte) << (8 * u32::from(i));
        }
        debug!("EC 0x{:02X} ({} byte) = {}", register, count, value);
        Ok(value)
    }

    /// Write one byte while holding the platform lock.
    ///
    /// The lock is released whatever the write outcome. A failed release only
    /// warns: the value is already in the EC.
    pub fn write_register(&self, register: u8, value: u8) -> Result<()> {
        let token = self.mutex.acquire(self.lock_timeout).map_err(|e| {
            warn!("Failed to acquire platform lock for EC 0x{:02X}: {}", register, e);
            e
        })?;

        let written = self.bus.write_byte(register, value);

        if let Err(e) = self.mutex.release(token) {
            warn!("Failed to release platform lock after EC 0x{:02X}: {}", register, e);
        }

        if written.is_ok() {
            debug!("EC 0x{:02X} <- 0x{:02X}", register, value);
        }
        written
    }
}
