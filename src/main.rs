// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use billfold::session::{SessionProvider, SettingsSession, StaticSession};
use billfold::{cli, commands, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_over = matches.get_one::<String>("db").map(PathBuf::from);
    let conn = db::open_or_init(db_over.as_deref())?;

    let stored = SettingsSession::new(&conn);
    let pinned = matches
        .get_one::<String>("user")
        .map(|u| StaticSession::pinned(u))
        .transpose()?;
    let session: &dyn SessionProvider = match &pinned {
        Some(s) => s,
        None => &stored,
    };

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                db::db_path(db_over.as_deref())?.display()
            );
        }
        Some(("login", sub)) => commands::session::login(&stored, sub)?,
        Some(("logout", _)) => commands::session::logout(&stored)?,
        Some(("whoami", _)) => commands::session::whoami(session)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("invoice", sub)) => commands::invoices::handle(&conn, session, sub)?,
        Some(("item", sub)) => commands::items::handle(&conn, session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, session, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn, session)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
