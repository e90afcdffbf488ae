// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Currency;
use crate::session::{SessionProvider, SettingsSession};
use crate::utils::{get_default_currency, pretty_table, set_default_currency};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let user = SettingsSession::new(conn)
                .current_user()?
                .map(|u| u.id)
                .unwrap_or_default();
            let rows = vec![
                vec![
                    "default_currency".to_string(),
                    get_default_currency(conn)?.to_string(),
                ],
                vec!["session_user".to_string(), user],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set-currency", sub)) => {
            let ccy: Currency = sub
                .get_one::<String>("currency")
                .context("Missing <currency>")?
                .parse()?;
            set_default_currency(conn, ccy)?;
            println!("New invoices will use {}", ccy);
        }
        _ => {}
    }
    Ok(())
}
