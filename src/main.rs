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

use clap::Parser;

use oxpec::cli::Cli;
use oxpec::{commands, logger};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_tracing(cli.verbose);

    if let Err(err) = commands::run(&cli) {
        if logger::is_enabled() {
            logger::log_event("fatal_error", serde_json::json!({ "error": format!("{:#}", err) }));
        }
        return Err(err);
    }
    Ok(())
}
