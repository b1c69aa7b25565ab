//! Board identification
//!
//! Picks exactly one registry entry for the running machine from the DMI
//! vendor and board name plus the boot CPU vendor.

use oxp_error::{OxpError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::registry::{is_known_vendor, BoardProfile, BOARDS};

/// Boot CPU vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuVendor {
    Amd,
    Intel,
    Other,
}

impl CpuVendor {
    /// Map a `/proc/cpuinfo` `vendor_id` string.
    pub fn from_vendor_id(vendor_id: &str) -> Self {
        match vendor_id.trim() {
            "AuthenticAMD" => CpuVendor::Amd,
            "GenuineIntel" => CpuVendor::Intel,
            _ => CpuVendor::Other,
        }
    }
}

/// Raw identity strings reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub board_vendor: String,
    pub board_name: String,
    pub cpu_vendor: CpuVendor,
}

impl SystemIdentity {
    pub fn new(board_vendor: impl Into<String>, board_name: impl Into<String>, cpu_vendor: CpuVendor) -> Self {
        Self {
            board_vendor: board_vendor.into(),
            board_name: board_name.into(),
            cpu_vendor,
        }
    }
}

/// Match an identity against the board table.
///
/// Vendor and board name compare case-insensitively. When several entries
/// share a board name the CPU vendor decides.
pub fn identify(vendor: &str, model: &str, cpu_vendor: CpuVendor) -> Option<BoardProfile> {
    if !is_known_vendor(vendor) {
        debug!("Board vendor {:?} is not supported", vendor);
        return None;
    }

    let entry = BOARDS.iter().find(|entry| {
        entry.matches_name(model) && entry.family.expected_cpu() == Some(cpu_vendor)
    });

    match entry {
        Some(entry) => entry.profile(),
        None => {
            debug!("No board entry for {:?} with {:?} CPU", model, cpu_vendor);
            None
        }
    }
}

/// Identify the board or fail with `NoMatch`.
pub fn probe(identity: &SystemIdentity) -> Result<BoardProfile> {
    let profile = identify(&identity.board_vendor, &identity.board_name, identity.cpu_vendor)
        .ok_or_else(|| OxpError::no_match(&identity.board_vendor, &identity.board_name))?;
    info!(
        "Matched {} {} as {}",
        identity.board_vendor,
        identity.board_name,
        profile.family.name()
    );
    Ok(profile)
}
