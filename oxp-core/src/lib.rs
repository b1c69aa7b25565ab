//! oxp-core
//!
//! Embedded controller access and board abstraction for OneXPlayer
//! handhelds.
//!
//! # Module Structure
//!
//! - `hw/` - EC byte access, the platform lock, the register transport
//! - `board/` - board registry and identification
//! - `sensors` - fan and PWM read/write semantics per board family
//! - `hwmon` - hwmon-style attribute visibility, read and write
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use oxp_core::{
//!     read_identity, DeviceSession, FanFlags, FlockMutex, RegisterTransport, SysfsEcBus,
//! };
//!
//! let identity = read_identity()?;
//! let transport = RegisterTransport::new(
//!     SysfsEcBus::open("/sys/kernel/debug/ec/ec0/io")?,
//!     FlockMutex::new("/run/lock/oxpec-ec.lock"),
//! );
//! let session = DeviceSession::attach(&identity, transport, Arc::new(FanFlags::new(false, false)))?;
//! println!("fan max {} RPM", session.fan_max());
//! # Ok::<(), oxp_core::OxpError>(())
//! ```

pub mod board;
pub mod constants;
pub mod hw;
pub mod hwmon;
pub mod sensors;
pub mod settings;
pub mod system;

#[cfg(test)]
pub(crate) mod test_utils;

pub use oxp_error::{OxpError, Result};

pub use board::{
    identify, probe, sensor_address, BoardFamily, BoardProfile, CpuVendor, SensorAddress, SensorKind,
    SystemIdentity,
};
pub use hw::{ByteWidth, EcBus, FlockMutex, HardwareMutex, RegisterTransport, SysfsEcBus, Token};
pub use hwmon::{Attribute, HwmonSnapshot, Visibility};
pub use sensors::{DeviceSession, PwmEnable};
pub use settings::{
    get_settings_path, load_settings, load_settings_from, save_settings_to, DriverSettings, FanFlags,
    FlagSnapshot,
};
pub use system::{ensure_ec_sys_loaded, read_identity, read_identity_from};

/// Session over the production EC interface and platform lock
pub type PlatformSession = DeviceSession<SysfsEcBus, FlockMutex>;
