//! Constants and configuration values for oxpec
//!
//! Centralizes paths, timeouts and value ranges used across the crate.

use std::time::Duration;

/// System paths
pub mod paths {
    /// `ec_sys` debugfs interface, one byte per EC register
    pub const EC_IO: &str = "/sys/kernel/debug/ec/ec0/io";

    /// Lock file backing the shared EC lock
    pub const EC_LOCK: &str = "/run/lock/oxpec-ec.lock";

    /// System configuration directory
    pub const CONFIG_DIR: &str = "/etc/oxpec";

    /// Settings file name inside CONFIG_DIR
    pub const SETTINGS_FILE: &str = "settings.json";

    /// Environment variable overriding the settings file location
    pub const CONFIG_ENV: &str = "OXPEC_CONFIG";

    pub const DMI_BOARD_VENDOR: &str = "/sys/devices/virtual/dmi/id/board_vendor";
    pub const DMI_BOARD_NAME: &str = "/sys/devices/virtual/dmi/id/board_name";
    pub const CPUINFO: &str = "/proc/cpuinfo";
}

/// Platform lock timing
pub mod lock {
    use super::Duration;

    /// Upper bound on waiting for the platform lock before a write
    pub const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(500);

    /// Poll interval while the lock is contended
    pub const POLL_INTERVAL: Duration = Duration::from_millis(5);
}

/// PWM value ranges
pub mod pwm {
    /// Externally visible PWM range is always 0..=255
    pub const MAX: u32 = 255;

    /// AMD boards keep the duty cycle as a percentage
    pub const AMD_NATIVE_MAX: u32 = 100;

    /// hwmon `pwm1_enable` values
    pub mod enable {
        pub const DISABLED: i64 = 0;
        pub const MANUAL: i64 = 1;
    }
}

/// hwmon exposition
pub mod hwmon {
    /// Device name reported to the exposition layer
    pub const DEVICE_NAME: &str = "oxpec";

    pub const MODE_HIDDEN: u16 = 0;
    pub const MODE_READ_ONLY: u16 = 0o444;
    pub const MODE_READ_WRITE: u16 = 0o644;
}

/// Kernel module providing the EC io file
pub mod modules {
    pub const EC_SYS: &str = "ec_sys";
    pub const EC_SYS_WRITE_PARAM: &str = "write_support=1";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_timeout_is_500ms() {
        assert_eq!(lock::ACQUIRE_TIMEOUT.as_millis(), 500);
        assert!(lock::POLL_INTERVAL < lock::ACQUIRE_TIMEOUT);
    }

    #[test]
    fn test_hwmon_modes() {
        assert_eq!(hwmon::MODE_READ_ONLY, 0o444);
        assert_eq!(hwmon::MODE_READ_WRITE, 0o644);
    }
}
