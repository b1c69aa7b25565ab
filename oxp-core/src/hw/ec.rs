//! Embedded controller byte access
//!
//! The EC exposes 256 one-byte registers. On Linux they are reachable through
//! the `ec_sys` debugfs file, where the file offset is the register address.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use oxp_error::{OxpError, Result};
use tracing::{debug, trace};

/// Single-byte access to EC registers.
///
/// Implementations must not take the platform lock; that is the transport's
/// job.
#[cfg_attr(test, mockall::automock)]
pub trait EcBus {
    fn read_byte(&self, register: u8) -> Result<u8>;
    fn write_byte(&self, register: u8, value: u8) -> Result<()>;
}

/// EC bus backed by the `ec_sys` io file.
#[derive(Debug)]
pub struct SysfsEcBus {
    path: PathBuf,
    file: File,
    writable: bool,
}

impl SysfsEcBus {
    /// Open the io file, falling back to read-only when `ec_sys` was loaded
    /// without write support.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(OxpError::EcUnavailable(path));
        }

        match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => {
                debug!("Opened EC io file {} read-write", path.display());
                Ok(Self { path, file, writable: true })
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                let file = File::open(&path)?;
                debug!("Opened EC io file {} read-only", path.display());
                Ok(Self { path, file, writable: false })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

impl EcBus for SysfsEcBus {
    fn read_byte(&self, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = self
            .file
            .read_at(&mut buf, u64::from(register))
            .map_err(|e| OxpError::ec(register, format!("read failed: {}", e)))?;
        if n != 1 {
            return Err(OxpError::ec(register, "short read"));
        }
        trace!("EC read 0x{:02X} -> 0x{:02X}", register, buf[0]);
        Ok(buf[0])
    }

    fn write_byte(&self, register: u8, value: u8) -> Result<()> {
        if !self.writable {
            return Err(OxpError::ec(
                register,
                "EC io file is read-only (load ec_sys with write_support=1)",
            ));
        }
        let n = self
            .file
            .write_at(&[value], u64::from(register))
            .map_err(|e| OxpError::ec(register, format!("write failed: {}", e)))?;
        if n != 1 {
            return Err(OxpError::ec(register, "short write"));
        }
        trace!("EC write 0x{:02X} <- 0x{:02X}", register, value);
        Ok(())
    }
}
