/*
 * This file is part of oxpec.
 *
 * Copyright (C) 2025 oxpec contributors
 *
 * oxpec is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * oxpec is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with oxpec. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::info;

use oxp_core::hwmon::{self, Attribute, HwmonSnapshot};
use oxp_core::{
    ensure_ec_sys_loaded, get_settings_path, identify, load_settings_from, read_identity,
    save_settings_to, DriverSettings, FanFlags, FlockMutex, PlatformSession, RegisterTransport,
    SensorKind, SysfsEcBus,
};

use crate::cli::{Cli, Command};
use crate::logger;

/// Settings file values with command-line overrides applied
pub fn resolve_settings(cli: &Cli) -> Result<DriverSettings> {
    let path = cli.config.clone().unwrap_or_else(get_settings_path);
    let mut settings = load_settings_from(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;

    if cli.fan_control {
        settings.fan_control = true;
    }
    if cli.fan_input_intel {
        settings.fan_input_intel = true;
    }
    if let Some(p) = &cli.ec_path {
        settings.ec_io_path = p.clone();
    }
    if let Some(p) = &cli.lock_path {
        settings.lock_path = p.clone();
    }
    Ok(settings)
}

/// Identify the machine and bind a session on the real EC
pub fn open_session(settings: &DriverSettings) -> Result<PlatformSession> {
    let identity = read_identity().context("reading system identity")?;
    ensure_ec_sys_loaded(&settings.ec_io_path)?;
    let bus = SysfsEcBus::open(&settings.ec_io_path)
        .with_context(|| format!("opening {}", settings.ec_io_path.display()))?;
    let transport = RegisterTransport::new(bus, FlockMutex::new(&settings.lock_path));
    let flags = Arc::new(FanFlags::from_settings(settings));
    Ok(PlatformSession::attach(&identity, transport, flags)?)
}

/// Human readable status listing
pub fn format_snapshot(snapshot: &HwmonSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", snapshot.name, snapshot.family.name());
    for attr in &snapshot.attributes {
        let shown = match (&attr.value, &attr.text, &attr.error) {
            (Some(v), _, _) => v.to_string(),
            (_, Some(t), _) => t.clone(),
            (_, _, Some(e)) => format!("error: {}", e),
            _ => "-".to_string(),
        };
        let _ = writeln!(out, "  {:<12} {:>4o}  {}", attr.name, attr.mode, shown);
    }
    out
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

fn write_attribute(cli: &Cli, attr: Attribute, value: i64) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let session = open_session(&settings)?;
    let before = hwmon::read(&session, SensorKind::Pwm, attr, 0).ok();

    hwmon::write(&session, SensorKind::Pwm, attr, 0, value).with_context(|| {
        format!("writing {}", hwmon::attribute_name(SensorKind::Pwm, attr, 0))
    })?;

    logger::log_event(
        "ec_write",
        json!({
            "attribute": hwmon::attribute_name(SensorKind::Pwm, attr, 0),
            "family": session.family().name(),
            "before": before,
            "value": value,
        }),
    );
    info!("{} set to {}", hwmon::attribute_name(SensorKind::Pwm, attr, 0), value);
    Ok(())
}

fn cmd_probe(cli: &Cli) -> Result<()> {
    let identity = read_identity().context("reading system identity")?;
    let profile = identify(&identity.board_vendor, &identity.board_name, identity.cpu_vendor);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "identity": identity,
                "profile": profile,
            }))?
        );
        return Ok(());
    }

    println!("Board vendor: {}", identity.board_vendor);
    println!("Board name:   {}", identity.board_name);
    println!("CPU vendor:   {:?}", identity.cpu_vendor);
    match profile {
        Some(p) => {
            println!("Family:       {}", p.family.name());
            println!("Max speed:    {} RPM", p.nominal_max_speed());
        }
        None => println!("Unsupported device"),
    }
    Ok(())
}

fn cmd_status(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let session = open_session(&settings)?;
    let snapshot = hwmon::snapshot(&session);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}

fn cmd_save(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let path = cli.config.clone().unwrap_or_else(get_settings_path);
    save_settings_to(&path, &settings)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    println!("Wrote settings to {}", path.display());
    Ok(())
}

/// Dispatch one command
pub fn run(cli: &Cli) -> Result<()> {
    if cli.command.needs_root() && !is_root() {
        bail!("this command needs root privileges, run it with sudo");
    }

    if cli.audit_log {
        logger::init_logging(std::path::Path::new(logger::DEFAULT_LOG_PATH));
        logger::log_event("startup", json!({ "command": format!("{:?}", cli.command) }));
    }

    match &cli.command {
        Command::Probe => cmd_probe(cli),
        Command::Status => cmd_status(cli),
        Command::SetPwm { value } => write_attribute(cli, Attribute::Input, *value),
        Command::Enable => write_attribute(cli, Attribute::Enable, 1),
        Command::Disable => write_attribute(cli, Attribute::Enable, 0),
        Command::Save => cmd_save(cli),
    }
}
