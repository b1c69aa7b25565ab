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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "oxpec",
    about = "Fan telemetry and control for OneXPlayer handhelds through the embedded controller",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (default: /etc/oxpec/settings.json or $OXPEC_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Allow PWM and enable writes
    #[arg(long, global = true)]
    pub fan_control: bool,

    /// Report a fan speed estimated from PWM duty on Intel boards
    #[arg(long, global = true)]
    pub fan_input_intel: bool,

    /// EC io file exposed by ec_sys
    #[arg(long, global = true)]
    pub ec_path: Option<PathBuf>,

    /// Lock file shared by every EC writer
    #[arg(long, global = true)]
    pub lock_path: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append every EC write to the JSON audit log
    #[arg(long, global = true)]
    pub audit_log: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Identify the board without touching the EC
    Probe,

    /// Read every visible fan and PWM attribute
    Status,

    /// Set PWM duty (0-255)
    SetPwm {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Take fan control away from firmware
    Enable,

    /// Return fan control to firmware
    Disable,

    /// Write the effective settings to the settings file
    Save,
}

impl Command {
    /// Commands that touch the EC under debugfs or write to /etc
    pub fn needs_root(&self) -> bool {
        !matches!(self, Command::Probe)
    }
}
