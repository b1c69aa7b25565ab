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

//! oxpec - fan telemetry and control for OneXPlayer handhelds
//!
//! Command-line front end over `oxp-core`: argument parsing, settings
//! resolution, logging and the audit trail of EC writes.

pub mod cli;
pub mod commands;
pub mod logger;
