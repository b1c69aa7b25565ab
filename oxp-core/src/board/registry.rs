//! Board registry
//!
//! Compiled-in register maps for every supported board family. AMD and Intel
//! boards share DMI strings, so each entry also names the CPU vendor it
//! applies to.

use serde::Serialize;

use super::identify::CpuVendor;
use crate::constants::pwm;
use crate::hw::ByteWidth;

/// Hardware variant class determining register layout and value ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoardFamily {
    Unknown,
    MiniAmd,
    MiniIntel,
}

impl BoardFamily {
    /// CPU vendor a board of this family is built on
    pub fn expected_cpu(self) -> Option<CpuVendor> {
        match self {
            BoardFamily::MiniAmd => Some(CpuVendor::Amd),
            BoardFamily::MiniIntel => Some(CpuVendor::Intel),
            BoardFamily::Unknown => None,
        }
    }

    /// Upper bound of the PWM duty value as the EC stores it
    pub fn pwm_native_max(self) -> u32 {
        match self {
            BoardFamily::MiniAmd => pwm::AMD_NATIVE_MAX,
            BoardFamily::MiniIntel | BoardFamily::Unknown => pwm::MAX,
        }
    }

    /// Intel boards have no tachometer; their "fan" register is the PWM duty.
    pub fn has_tachometer(self) -> bool {
        matches!(self, BoardFamily::MiniAmd)
    }

    pub fn name(self) -> &'static str {
        match self {
            BoardFamily::Unknown => "unknown",
            BoardFamily::MiniAmd => "mini-amd",
            BoardFamily::MiniIntel => "mini-intel",
        }
    }
}

/// Logical sensor channel within a board profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorKind {
    Fan,
    Pwm,
}

impl SensorKind {
    pub const ALL: [SensorKind; 2] = [SensorKind::Fan, SensorKind::Pwm];

    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Fan => "fan",
            SensorKind::Pwm => "pwm",
        }
    }
}

/// Where one sensor lives in the EC and how to drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorAddress {
    pub register: u8,
    pub byte_width: ByteWidth,
    pub enable_register: Option<u8>,
    pub enable_value: u8,
    pub disable_value: u8,
    /// Only set on fan entries
    pub nominal_max_speed: Option<u32>,
}

impl SensorAddress {
    const fn fan(register: u8, byte_width: ByteWidth, max_speed: u32) -> Self {
        Self {
            register,
            byte_width,
            enable_register: None,
            enable_value: 0,
            disable_value: 0,
            nominal_max_speed: Some(max_speed),
        }
    }

    const fn pwm(register: u8, enable_register: u8, enable_value: u8, disable_value: u8) -> Self {
        Self {
            register,
            byte_width: ByteWidth::One,
            enable_register: Some(enable_register),
            enable_value,
            disable_value,
            nominal_max_speed: None,
        }
    }
}

// AMD board EC addresses
const AMD_FAN: SensorAddress = SensorAddress::fan(0x76, ByteWidth::Two, 5000);
const AMD_PWM: SensorAddress = SensorAddress::pwm(0x4B, 0x4A, 0x01, 0x00);

// Intel board EC addresses. The fan entry points at the PWM register, speed
// is derived from the duty cycle.
const INTEL_FAN: SensorAddress = SensorAddress::fan(0xC5, ByteWidth::One, 4700);
const INTEL_PWM: SensorAddress = SensorAddress::pwm(0xC5, 0xCA, 0x88, 0xC4);

/// Register map for `(family, kind)`. `None` for the unknown family.
pub fn sensor_address(family: BoardFamily, kind: SensorKind) -> Option<SensorAddress> {
    match (family, kind) {
        (BoardFamily::MiniAmd, SensorKind::Fan) => Some(AMD_FAN),
        (BoardFamily::MiniAmd, SensorKind::Pwm) => Some(AMD_PWM),
        (BoardFamily::MiniIntel, SensorKind::Fan) => Some(INTEL_FAN),
        (BoardFamily::MiniIntel, SensorKind::Pwm) => Some(INTEL_PWM),
        (BoardFamily::Unknown, _) => None,
    }
}

/// Register layout bound to one device for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardProfile {
    pub family: BoardFamily,
    pub board_names: &'static [&'static str],
    fan: SensorAddress,
    pwm: SensorAddress,
}

impl BoardProfile {
    pub fn sensor(&self, kind: SensorKind) -> &SensorAddress {
        match kind {
            SensorKind::Fan => &self.fan,
            SensorKind::Pwm => &self.pwm,
        }
    }

    /// Nominal fan speed at full duty, in RPM
    pub fn nominal_max_speed(&self) -> u32 {
        self.fan.nominal_max_speed.unwrap_or(0)
    }
}

/// Manufacturer strings reported in DMI board_vendor
pub const BOARD_VENDORS: &[&str] = &["ONE-NETBOOK TECHNOLOGY CO., LTD.", "ONE-NETBOOK"];

/// One row of the board table.
#[derive(Debug, Clone, Copy)]
pub struct BoardEntry {
    pub board_names: &'static [&'static str],
    pub family: BoardFamily,
}

impl BoardEntry {
    /// Build the profile for this entry. `None` only for the unknown family.
    pub fn profile(&self) -> Option<BoardProfile> {
        Some(BoardProfile {
            family: self.family,
            board_names: self.board_names,
            fan: sensor_address(self.family, SensorKind::Fan)?,
            pwm: sensor_address(self.family, SensorKind::Pwm)?,
        })
    }

    pub fn matches_name(&self, board_name: &str) -> bool {
        self.board_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(board_name))
    }
}

/// Known boards. Identical names are told apart by CPU vendor.
pub const BOARDS: &[BoardEntry] = &[
    BoardEntry {
        board_names: &["ONE XPLAYER", "ONEXPLAYER mini A07"],
        family: BoardFamily::MiniAmd,
    },
    BoardEntry {
        board_names: &["ONE XPLAYER"],
        family: BoardFamily::MiniIntel,
    },
];

pub fn is_known_vendor(vendor: &str) -> bool {
    BOARD_VENDORS.iter().any(|v| v.eq_ignore_ascii_case(vendor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amd_register_map() {
        let fan = sensor_address(BoardFamily::MiniAmd, SensorKind::Fan).unwrap();
        assert_eq!(fan.register, 0x76);
        assert_eq!(fan.byte_width, ByteWidth::Two);
        assert_eq!(fan.nominal_max_speed, Some(5000));
        assert_eq!(fan.enable_register, None);

        let pwm = sensor_address(BoardFamily::MiniAmd, SensorKind::Pwm).unwrap();
        assert_eq!(pwm.register, 0x4B);
        assert_eq!(pwm.enable_register, Some(0x4A));
        assert_eq!((pwm.enable_value, pwm.disable_value), (0x01, 0x00));
        assert_eq!(pwm.nominal_max_speed, None);
    }

    #[test]
    fn test_intel_register_map() {
        let fan = sensor_address(BoardFamily::MiniIntel, SensorKind::Fan).unwrap();
        let pwm = sensor_address(BoardFamily::MiniIntel, SensorKind::Pwm).unwrap();
        // fan speed is emulated from the PWM register
        assert_eq!(fan.register, pwm.register);
        assert_eq!(fan.byte_width, ByteWidth::One);
        assert_eq!(fan.nominal_max_speed, Some(4700));
        assert_eq!(pwm.enable_register, Some(0xCA));
        assert_eq!((pwm.enable_value, pwm.disable_value), (0x88, 0xC4));
    }

    #[test]
    fn test_unknown_family_has_no_sensors() {
        for kind in SensorKind::ALL {
            assert!(sensor_address(BoardFamily::Unknown, kind).is_none());
        }
        let entry = BoardEntry { board_names: &["X"], family: BoardFamily::Unknown };
        assert!(entry.profile().is_none());
    }

    #[test]
    fn test_family_properties() {
        assert_eq!(BoardFamily::MiniAmd.pwm_native_max(), 100);
        assert_eq!(BoardFamily::MiniIntel.pwm_native_max(), 255);
        assert!(BoardFamily::MiniAmd.has_tachometer());
        assert!(!BoardFamily::MiniIntel.has_tachometer());
        assert_eq!(BoardFamily::MiniAmd.expected_cpu(), Some(CpuVendor::Amd));
        assert_eq!(BoardFamily::MiniIntel.expected_cpu(), Some(CpuVendor::Intel));
        assert_eq!(BoardFamily::Unknown.expected_cpu(), None);
    }

    #[test]
    fn test_every_table_entry_builds_a_profile() {
        for entry in BOARDS {
            let profile = entry.profile().unwrap();
            assert_eq!(profile.family, entry.family);
            assert!(profile.nominal_max_speed() > 0);
            assert!(profile.sensor(SensorKind::Pwm).enable_register.is_some());
        }
    }

    #[test]
    fn test_name_matching_ignores_case() {
        let amd = &BOARDS[0];
        assert!(amd.matches_name("one xplayer"));
        assert!(amd.matches_name("ONEXPLAYER MINI A07"));
        assert!(!amd.matches_name("ONE XPLAYER 2"));
        assert!(!BOARDS[1].matches_name("ONEXPLAYER mini A07"));
    }

    #[test]
    fn test_vendor_allow_list() {
        assert!(is_known_vendor("ONE-NETBOOK"));
        assert!(is_known_vendor("one-netbook technology co., ltd."));
        assert!(!is_known_vendor("Acme"));
        assert!(!is_known_vendor(""));
    }
}
