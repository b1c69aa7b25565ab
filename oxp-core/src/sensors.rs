//! Sensor semantics
//!
//! Read and write contracts for the fan and PWM channels of a bound board.
//!
//! # PWM Values
//!
//! Callers always see PWM duty in 0..=255. AMD boards store it as 0..=100 in
//! the EC, so reads scale up and writes scale down. All scaling truncates,
//! which makes a write/read round trip on AMD lossy by up to one EC step.
//!
//! # Fan Speed
//!
//! AMD boards have a tachometer and report RPM directly. Intel boards do not;
//! their speed is estimated from the PWM duty and the nominal maximum speed,
//! and only when emulation is switched on.

use std::sync::Arc;

use oxp_error::{OxpError, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{probe, BoardFamily, BoardProfile, SensorAddress, SensorKind, SystemIdentity};
use crate::constants::pwm;
use crate::hw::{ByteWidth, EcBus, HardwareMutex, RegisterTransport};
use crate::settings::{FanFlags, FlagSnapshot};

/// PWM enable state as decoded from the enable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PwmEnable {
    Enabled,
    /// Disable value or anything unrecognised
    Disabled,
}

impl PwmEnable {
    /// Only an exact match with the enable value counts as enabled.
    pub fn from_raw(raw: u8, sensor: &SensorAddress) -> Self {
        if raw == sensor.enable_value {
            PwmEnable::Enabled
        } else {
            PwmEnable::Disabled
        }
    }

    pub fn as_hwmon(self) -> i64 {
        match self {
            PwmEnable::Enabled => pwm::enable::MANUAL,
            PwmEnable::Disabled => pwm::enable::DISABLED,
        }
    }
}

/// One attached device: its board profile, EC transport and flags.
#[derive(Debug)]
pub struct DeviceSession<B, M> {
    profile: BoardProfile,
    transport: RegisterTransport<B, M>,
    flags: Arc<FanFlags>,
}

impl<B: EcBus, M: HardwareMutex> DeviceSession<B, M> {
    pub fn new(profile: BoardProfile, transport: RegisterTransport<B, M>, flags: Arc<FanFlags>) -> Self {
        Self { profile, transport, flags }
    }

    /// Identify the board and bind a session, `NoMatch` if unsupported.
    pub fn attach(
        identity: &SystemIdentity,
        transport: RegisterTransport<B, M>,
        flags: Arc<FanFlags>,
    ) -> Result<Self> {
        let profile = probe(identity)?;
        let snapshot = flags.snapshot();
        info!(
            "Attached {} board (fan_control={}, fan_input_intel={})",
            profile.family.name(),
            snapshot.fan_control_enabled,
            snapshot.emulate_fan_on_intel
        );
        Ok(Self::new(profile, transport, flags))
    }

    pub fn profile(&self) -> &BoardProfile {
        &self.profile
    }

    pub fn family(&self) -> BoardFamily {
        self.profile.family
    }

    /// Shared flag set, for runtime toggling
    pub fn flag_handle(&self) -> &Arc<FanFlags> {
        &self.flags
    }

    pub fn flags(&self) -> FlagSnapshot {
        self.flags.snapshot()
    }

    /// Whether a fan speed can be reported with these flags
    pub fn fan_input_available(&self, flags: FlagSnapshot) -> bool {
        self.family().has_tachometer() || flags.emulate_fan_on_intel
    }

    /// Current fan speed in RPM
    pub fn fan_read(&self) -> Result<u32> {
        let flags = self.flags.snapshot();
        if !self.fan_input_available(flags) {
            return Err(OxpError::unsupported(
                "fan speed on Intel boards needs fan_input_intel",
            ));
        }

        let fan = self.profile.sensor(SensorKind::Fan);
        let raw = self.transport.read_register(fan.register, fan.byte_width)?;
        match self.family() {
            BoardFamily::MiniIntel => {
                let max = u64::from(self.fan_max());
                let rpm = u64::from(raw) * max / u64::from(pwm::MAX);
                debug!("Estimated fan speed {} RPM from duty {}", rpm, raw);
                Ok(rpm as u32)
            }
            _ => Ok(raw),
        }
    }

    /// Nominal maximum speed. No EC access.
    pub fn fan_max(&self) -> u32 {
        self.profile.nominal_max_speed()
    }

    pub fn fan_min(&self) -> u32 {
        0
    }

    /// PWM duty scaled to 0..=255
    pub fn pwm_read(&self) -> Result<u32> {
        let pwm_sensor = self.profile.sensor(SensorKind::Pwm);
        let raw = self
            .transport
            .read_register(pwm_sensor.register, pwm_sensor.byte_width)?;
        Ok(self.to_external_pwm(raw))
    }

    /// Raw byte of the enable register
    pub fn pwm_enable_read(&self) -> Result<u8> {
        let register = self.enable_register()?;
        let raw = self.transport.read_register(register, ByteWidth::One)?;
        Ok(raw as u8)
    }

    pub fn pwm_enable_state(&self) -> Result<PwmEnable> {
        let raw = self.pwm_enable_read()?;
        Ok(PwmEnable::from_raw(raw, self.profile.sensor(SensorKind::Pwm)))
    }

    /// Set PWM duty from a 0..=255 value
    pub fn pwm_write(&self, value: i64) -> Result<()> {
        let flags = self.flags.snapshot();
        if !flags.fan_control_enabled {
            return Err(OxpError::unsupported("fan control is disabled"));
        }
        if !(0..=i64::from(pwm::MAX)).contains(&value) {
            return Err(OxpError::invalid(format!("PWM value {} outside 0-255", value)));
        }

        let native = self.to_native_pwm(value as u32);
        let register = self.profile.sensor(SensorKind::Pwm).register;
        self.transport.write_register(register, native as u8)
    }

    /// Hand fan control to the host (1) or back to firmware (0)
    pub fn pwm_enable_write(&self, value: i64) -> Result<()> {
        let flags = self.flags.snapshot();
        if !flags.fan_control_enabled {
            return Err(OxpError::unsupported("fan control is disabled"));
        }

        let pwm_sensor = self.profile.sensor(SensorKind::Pwm);
        let encoded = match value {
            pwm::enable::MANUAL => pwm_sensor.enable_value,
            pwm::enable::DISABLED => pwm_sensor.disable_value,
            other => {
                return Err(OxpError::invalid(format!("PWM enable value {} is not 0 or 1", other)));
            }
        };
        let register = self.enable_register()?;
        self.transport.write_register(register, encoded)
    }

    fn enable_register(&self) -> Result<u8> {
        self.profile
            .sensor(SensorKind::Pwm)
            .enable_register
            .ok_or_else(|| OxpError::unsupported("board has no PWM enable register"))
    }

    /// EC bytes past the native maximum still report as full duty.
    fn to_external_pwm(&self, raw: u32) -> u32 {
        let native_max = self.family().pwm_native_max();
        (raw * pwm::MAX / native_max).min(pwm::MAX)
    }

    fn to_native_pwm(&self, value: u32) -> u32 {
        value * self.family().pwm_native_max() / pwm::MAX
    }
}
