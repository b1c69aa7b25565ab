//! Platform identity and EC access bootstrap

use std::fs;
use std::path::Path;
use std::process::Command;

use oxp_error::{OxpError, Result};
use tracing::{debug, info};

use crate::board::{CpuVendor, SystemIdentity};
use crate::constants::{modules, paths};

fn read_trim(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// CPU vendor from the first `vendor_id` line of cpuinfo text
pub fn parse_cpu_vendor(cpuinfo: &str) -> CpuVendor {
    cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("vendor_id"))
        .map(|(_, v)| CpuVendor::from_vendor_id(v))
        .unwrap_or(CpuVendor::Other)
}

/// Read the identity of the running machine
pub fn read_identity() -> Result<SystemIdentity> {
    read_identity_from(
        Path::new(paths::DMI_BOARD_VENDOR),
        Path::new(paths::DMI_BOARD_NAME),
        Path::new(paths::CPUINFO),
    )
}

/// Read identity from explicit files. A missing DMI string means the device
/// cannot be supported.
pub fn read_identity_from(vendor_path: &Path, name_path: &Path, cpuinfo_path: &Path) -> Result<SystemIdentity> {
    let vendor = read_trim(vendor_path);
    let name = read_trim(name_path);
    let (vendor, name) = match (vendor, name) {
        (Some(v), Some(n)) => (v, n),
        (v, n) => {
            return Err(OxpError::no_match(v.unwrap_or_default(), n.unwrap_or_default()));
        }
    };

    let cpu_vendor = fs::read_to_string(cpuinfo_path)
        .map(|s| parse_cpu_vendor(&s))
        .unwrap_or(CpuVendor::Other);

    debug!("System identity: {:?} / {:?} / {:?}", vendor, name, cpu_vendor);
    Ok(SystemIdentity::new(vendor, name, cpu_vendor))
}

/// Load `ec_sys` with write support if its io file is missing
pub fn ensure_ec_sys_loaded(ec_io: &Path) -> Result<()> {
    if ec_io.exists() {
        return Ok(());
    }

    info!("{} missing, loading {}", ec_io.display(), modules::EC_SYS);
    match Command::new("modprobe")
        .args([modules::EC_SYS, modules::EC_SYS_WRITE_PARAM])
        .output()
    {
        Ok(output) if !output.status.success() => {
            debug!(
                "modprobe {} failed: {}",
                modules::EC_SYS,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Err(e) => debug!("Could not run modprobe: {}", e),
        Ok(_) => {}
    }

    if ec_io.exists() {
        Ok(())
    } else {
        Err(OxpError::EcUnavailable(ec_io.to_path_buf()))
    }
}
