//! Driver settings
//!
//! Persistent settings stored as JSON in /etc/oxpec/settings.json, plus the
//! runtime flag set every sensor operation consults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use oxp_error::{OxpError, Result};
use tracing::debug;

use crate::constants::paths;

/// Settings file contents. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Allow PWM and enable writes
    pub fan_control: bool,
    /// Report an estimated fan speed on Intel boards
    pub fan_input_intel: bool,
    pub ec_io_path: PathBuf,
    pub lock_path: PathBuf,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            fan_control: false,
            fan_input_intel: false,
            ec_io_path: PathBuf::from(paths::EC_IO),
            lock_path: PathBuf::from(paths::EC_LOCK),
        }
    }
}

/// Settings path, honouring the `OXPEC_CONFIG` override
pub fn get_settings_path() -> PathBuf {
    match std::env::var_os(paths::CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => Path::new(paths::CONFIG_DIR).join(paths::SETTINGS_FILE),
    }
}

/// Load settings from the default location
pub fn load_settings() -> Result<DriverSettings> {
    load_settings_from(&get_settings_path())
}

/// Load settings from JSON file, defaults if it does not exist
pub fn load_settings_from(path: &Path) -> Result<DriverSettings> {
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(DriverSettings::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        OxpError::config(format!("Failed to read settings file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        OxpError::config(format!("Failed to parse settings JSON {}: {}", path.display(), e))
    })
}

/// Write settings atomically (temp file, then rename)
pub fn save_settings_to(path: &Path, settings: &DriverSettings) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    let temp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
        .map_err(|e| OxpError::config(format!("Failed to rename temp file: {}", e)))
}

const FAN_CONTROL: u8 = 0b01;
const FAN_INPUT_INTEL: u8 = 0b10;

/// Flags resolved at load time that may still be toggled while running.
///
/// Both flags share one atomic so a snapshot never mixes old and new values.
#[derive(Debug, Default)]
pub struct FanFlags {
    bits: AtomicU8,
}

/// Flag values seen by a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlagSnapshot {
    pub fan_control_enabled: bool,
    pub emulate_fan_on_intel: bool,
}

impl FanFlags {
    pub fn new(fan_control: bool, fan_input_intel: bool) -> Self {
        let mut bits = 0;
        if fan_control {
            bits |= FAN_CONTROL;
        }
        if fan_input_intel {
            bits |= FAN_INPUT_INTEL;
        }
        Self { bits: AtomicU8::new(bits) }
    }

    pub fn from_settings(settings: &DriverSettings) -> Self {
        Self::new(settings.fan_control, settings.fan_input_intel)
    }

    pub fn snapshot(&self) -> FlagSnapshot {
        let bits = self.bits.load(Ordering::Acquire);
        FlagSnapshot {
            fan_control_enabled: bits & FAN_CONTROL != 0,
            emulate_fan_on_intel: bits & FAN_INPUT_INTEL != 0,
        }
    }

    pub fn set_fan_control(&self, enabled: bool) {
        self.set(FAN_CONTROL, enabled);
    }

    pub fn set_fan_input_intel(&self, enabled: bool) {
        self.set(FAN_INPUT_INTEL, enabled);
    }

    fn set(&self, bit: u8, on: bool) {
        if on {
            self.bits.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.bits.fetch_and(!bit, Ordering::AcqRel);
        }
    }
}
