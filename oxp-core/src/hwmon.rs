//! hwmon-style exposition
//!
//! Maps `(sensor kind, attribute)` pairs onto session operations the way a
//! hwmon chip driver answers `is_visible`, `read` and `write`. There is a
//! single channel per kind.

use oxp_error::{OxpError, Result};
use serde::Serialize;
use tracing::debug;

use crate::board::{BoardFamily, SensorKind};
use crate::constants::hwmon::{DEVICE_NAME, MODE_HIDDEN, MODE_READ_ONLY, MODE_READ_WRITE};
use crate::hw::{EcBus, HardwareMutex};
use crate::sensors::DeviceSession;

/// Attribute of a sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Attribute {
    Input,
    Max,
    Min,
    Enable,
    Label,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Input,
        Attribute::Max,
        Attribute::Min,
        Attribute::Enable,
        Attribute::Label,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Hidden,
    ReadOnly,
    ReadWrite,
}

impl Visibility {
    /// sysfs file mode
    pub fn mode(self) -> u16 {
        match self {
            Visibility::Hidden => MODE_HIDDEN,
            Visibility::ReadOnly => MODE_READ_ONLY,
            Visibility::ReadWrite => MODE_READ_WRITE,
        }
    }

    pub fn is_readable(self) -> bool {
        self != Visibility::Hidden
    }

    pub fn is_writable(self) -> bool {
        self == Visibility::ReadWrite
    }
}

/// sysfs-style file name, e.g. `fan1_input` or `pwm1`
pub fn attribute_name(kind: SensorKind, attr: Attribute, channel: u32) -> String {
    let base = format!("{}{}", kind.name(), channel + 1);
    match (kind, attr) {
        (SensorKind::Pwm, Attribute::Input) => base,
        (_, Attribute::Input) => format!("{}_input", base),
        (_, Attribute::Max) => format!("{}_max", base),
        (_, Attribute::Min) => format!("{}_min", base),
        (_, Attribute::Enable) => format!("{}_enable", base),
        (_, Attribute::Label) => format!("{}_label", base),
    }
}

/// Negative errno for an error, as a hwmon callback would return it
pub fn errno(err: &OxpError) -> i32 {
    let code = match err {
        OxpError::Busy { .. } => libc::EBUSY,
        OxpError::Unsupported(_) => libc::EOPNOTSUPP,
        OxpError::InvalidArgument(_) | OxpError::Config(_) | OxpError::JsonParse(_) => libc::EINVAL,
        OxpError::NoMatch { .. } => libc::ENODEV,
        OxpError::EcTransaction { .. }
        | OxpError::MutexRelease(_)
        | OxpError::EcUnavailable(_)
        | OxpError::Io(_) => libc::EIO,
    };
    -code
}

/// Label text for a channel
pub fn label(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Fan => "EC Fan",
        SensorKind::Pwm => "EC Fan PWM",
    }
}

/// Whether an attribute exists and how it may be accessed
pub fn visibility<B: EcBus, M: HardwareMutex>(
    session: &DeviceSession<B, M>,
    kind: SensorKind,
    attr: Attribute,
    channel: u32,
) -> Visibility {
    if channel != 0 {
        return Visibility::Hidden;
    }

    match (kind, attr) {
        (SensorKind::Fan, Attribute::Input) => {
            if session.fan_input_available(session.flags()) {
                Visibility::ReadOnly
            } else {
                Visibility::Hidden
            }
        }
        (SensorKind::Fan, Attribute::Max | Attribute::Min | Attribute::Label) => Visibility::ReadOnly,
        (SensorKind::Fan, Attribute::Enable) => Visibility::Hidden,
        (SensorKind::Pwm, Attribute::Input | Attribute::Enable) => Visibility::ReadWrite,
        (SensorKind::Pwm, Attribute::Label) => Visibility::ReadOnly,
        (SensorKind::Pwm, Attribute::Max | Attribute::Min) => Visibility::Hidden,
    }
}

/// Read a numeric attribute
pub fn read<B: EcBus, M: HardwareMutex>(
    session: &DeviceSession<B, M>,
    kind: SensorKind,
    attr: Attribute,
    channel: u32,
) -> Result<i64> {
    if channel != 0 {
        return Err(OxpError::unsupported(format!("channel {} does not exist", channel)));
    }

    match (kind, attr) {
        (SensorKind::Fan, Attribute::Input) => session.fan_read().map(i64::from),
        (SensorKind::Fan, Attribute::Max) => Ok(i64::from(session.fan_max())),
        (SensorKind::Fan, Attribute::Min) => Ok(i64::from(session.fan_min())),
        (SensorKind::Pwm, Attribute::Input) => session.pwm_read().map(i64::from),
        (SensorKind::Pwm, Attribute::Enable) => session.pwm_enable_state().map(|s| s.as_hwmon()),
        (_, Attribute::Label) => Err(OxpError::unsupported("label is a string attribute")),
        _ => {
            debug!("Unknown attribute {:?} for {:?}", attr, kind);
            Err(OxpError::unsupported(format!("{:?} has no {:?} attribute", kind, attr)))
        }
    }
}

/// Read a string attribute
pub fn read_label(kind: SensorKind, attr: Attribute, channel: u32) -> Result<&'static str> {
    match (attr, channel) {
        (Attribute::Label, 0) => Ok(label(kind)),
        _ => Err(OxpError::unsupported(format!("{:?} {:?} is not a string attribute", kind, attr))),
    }
}

/// Write a numeric attribute
pub fn write<B: EcBus, M: HardwareMutex>(
    session: &DeviceSession<B, M>,
    kind: SensorKind,
    attr: Attribute,
    channel: u32,
    value: i64,
) -> Result<()> {
    if channel != 0 {
        return Err(OxpError::unsupported(format!("channel {} does not exist", channel)));
    }

    match (kind, attr) {
        (SensorKind::Pwm, Attribute::Input) => session.pwm_write(value),
        (SensorKind::Pwm, Attribute::Enable) => session.pwm_enable_write(value),
        _ => {
            debug!("Unknown writable attribute {:?} for {:?}", attr, kind);
            Err(OxpError::unsupported(format!("{:?} {:?} is read-only", kind, attr)))
        }
    }
}

/// One attribute as seen by a reader of the device directory.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeReading {
    pub name: String,
    pub mode: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Every visible attribute of a device, read once.
#[derive(Debug, Clone, Serialize)]
pub struct HwmonSnapshot {
    pub name: &'static str,
    pub family: BoardFamily,
    pub attributes: Vec<AttributeReading>,
}

impl HwmonSnapshot {
    pub fn get(&self, name: &str) -> Option<&AttributeReading> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Read every visible attribute. Failures are kept per attribute.
pub fn snapshot<B: EcBus, M: HardwareMutex>(session: &DeviceSession<B, M>) -> HwmonSnapshot {
    let mut attributes = Vec::new();

    for kind in SensorKind::ALL {
        for attr in Attribute::ALL {
            let vis = visibility(session, kind, attr, 0);
            if !vis.is_readable() {
                continue;
            }

            let mut reading = AttributeReading {
                name: attribute_name(kind, attr, 0),
                mode: vis.mode(),
                value: None,
                text: None,
                error: None,
            };
            if attr == Attribute::Label {
                reading.text = read_label(kind, attr, 0).ok().map(str::to_string);
            } else {
                match read(session, kind, attr, 0) {
                    Ok(v) => reading.value = Some(v),
                    Err(e) => reading.error = Some(e.to_string()),
                }
            }
            attributes.push(reading);
        }
    }

    HwmonSnapshot {
        name: DEVICE_NAME,
        family: session.family(),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{amd_profile, intel_profile, session, LockScript};

    #[test]
    fn test_attribute_names() {
        assert_eq!(attribute_name(SensorKind::Fan, Attribute::Input, 0), "fan1_input");
        assert_eq!(attribute_name(SensorKind::Fan, Attribute::Max, 0), "fan1_max");
        assert_eq!(attribute_name(SensorKind::Pwm, Attribute::Input, 0), "pwm1");
        assert_eq!(attribute_name(SensorKind::Pwm, Attribute::Enable, 0), "pwm1_enable");
    }

    #[test]
    fn test_fan_input_hidden_on_intel_without_emulation() {
        let (s, _, _) = session(intel_profile(), LockScript::Grant, false, false);
        assert_eq!(visibility(&s, SensorKind::Fan, Attribute::Input, 0), Visibility::Hidden);
        assert_eq!(visibility(&s, SensorKind::Fan, Attribute::Max, 0), Visibility::ReadOnly);

        s.flag_handle().set_fan_input_intel(true);
        assert_eq!(visibility(&s, SensorKind::Fan, Attribute::Input, 0), Visibility::ReadOnly);
    }

    #[test]
    fn test_amd_visibility() {
        let (s, _, _) = session(amd_profile(), LockScript::Grant, false, false);
        assert_eq!(visibility(&s, SensorKind::Fan, Attribute::Input, 0).mode(), 0o444);
        assert_eq!(visibility(&s, SensorKind::Pwm, Attribute::Input, 0).mode(), 0o644);
        assert_eq!(visibility(&s, SensorKind::Pwm, Attribute::Enable, 0), Visibility::ReadWrite);
        assert_eq!(visibility(&s, SensorKind::Fan, Attribute::Enable, 0), Visibility::Hidden);
        assert_eq!(visibility(&s, SensorKind::Pwm, Attribute::Input, 1), Visibility::Hidden);
    }

    #[test]
    fn test_read_dispatch() {
        let (s, ec, _) = session(amd_profile(), LockScript::Grant, false, false);
        ec.set(0x76, 0x10);
        ec.set(0x77, 0x0E);
        ec.set(0x4B, 100);
        ec.set(0x4A, 0x01);
        assert_eq!(read(&s, SensorKind::Fan, Attribute::Input, 0).unwrap(), 0x0E10);
        assert_eq!(read(&s, SensorKind::Fan, Attribute::Max, 0).unwrap(), 5000);
        assert_eq!(read(&s, SensorKind::Fan, Attribute::Min, 0).unwrap(), 0);
        assert_eq!(read(&s, SensorKind::Pwm, Attribute::Input, 0).unwrap(), 255);
        assert_eq!(read(&s, SensorKind::Pwm, Attribute::Enable, 0).unwrap(), 1);
        assert!(read(&s, SensorKind::Pwm, Attribute::Max, 0).is_err());
        assert!(read(&s, SensorKind::Fan, Attribute::Label, 0).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(read_label(SensorKind::Fan, Attribute::Label, 0).unwrap(), "EC Fan");
        assert!(read_label(SensorKind::Fan, Attribute::Input, 0).is_err());
        assert!(read_label(SensorKind::Pwm, Attribute::Label, 3).is_err());
    }

    #[test]
    fn test_write_dispatch() {
        let (s, ec, _) = session(intel_profile(), LockScript::Grant, true, false);
        write(&s, SensorKind::Pwm, Attribute::Input, 0, 200).unwrap();
        write(&s, SensorKind::Pwm, Attribute::Enable, 0, 1).unwrap();
        assert_eq!(ec.writes(), vec![(0xC5, 200), (0xCA, 0x88)]);

        let err = write(&s, SensorKind::Fan, Attribute::Input, 0, 1).unwrap_err();
        assert_eq!(errno(&err), -libc::EOPNOTSUPP);
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(errno(&OxpError::Busy { timeout_ms: 500 }), -libc::EBUSY);
        assert_eq!(errno(&OxpError::invalid("x")), -libc::EINVAL);
        assert_eq!(errno(&OxpError::ec(0x4B, "x")), -libc::EIO);
        assert_eq!(errno(&OxpError::no_match("a", "b")), -libc::ENODEV);
    }

    #[test]
    fn test_snapshot_skips_hidden_and_keeps_errors() {
        let (s, ec, _) = session(intel_profile(), LockScript::Grant, false, false);
        ec.set(0xC5, 64);
        ec.fail_on(0xCA);
        let snap = snapshot(&s);

        assert_eq!(snap.name, "oxpec");
        assert!(snap.get("fan1_input").is_none());
        assert_eq!(snap.get("fan1_max").unwrap().value, Some(4700));
        assert_eq!(snap.get("pwm1").unwrap().value, Some(64));
        assert_eq!(snap.get("pwm1").unwrap().mode, 0o644);
        assert!(snap.get("pwm1_enable").unwrap().error.is_some());
        assert_eq!(snap.get("pwm1_label").unwrap().text.as_deref(), Some("EC Fan PWM"));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"MiniIntel\""));
    }
}
