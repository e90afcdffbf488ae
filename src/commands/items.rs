// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::invoices::{id_arg, load_owned, save};
use crate::items::{ItemEdit, apply_item_edit, new_item, remove_item};
use crate::models::Invoice;
use crate::session::{SessionProvider, User, require_user};
use crate::store::{RecordStore, SqliteStore};
use crate::utils::{fmt_money, parse_decimal};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &dyn SessionProvider, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let user = require_user(session)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let (inv, item_id) = add(&store, &user, sub)?;
            println!(
                "Added item {} (invoice total {})",
                item_id,
                fmt_money(&inv.total, inv.currency)
            );
        }
        Some(("set", sub)) => {
            let inv = set(&store, &user, sub)?;
            println!("Saved (invoice total {})", fmt_money(&inv.total, inv.currency));
        }
        Some(("rm", sub)) => {
            let inv = remove(&store, &user, sub)?;
            println!("Removed (invoice total {})", fmt_money(&inv.total, inv.currency));
        }
        _ => {}
    }
    Ok(())
}

/// Field changes requested on the command line, in a fixed order.
pub fn edits_from(sub: &clap::ArgMatches) -> Result<Vec<ItemEdit>> {
    let mut edits = Vec::new();
    if let Some(v) = sub.get_one::<String>("label") {
        edits.push(ItemEdit::Label(Some(v.trim().to_string())));
    }
    if let Some(v) = sub.get_one::<String>("detail") {
        edits.push(ItemEdit::Detail(Some(v.trim().to_string())));
    }
    if let Some(v) = sub.get_one::<String>("amount") {
        edits.push(ItemEdit::UnitAmount(parse_decimal(v)?));
    }
    if let Some(v) = sub.get_one::<String>("qty") {
        edits.push(ItemEdit::Quantity(parse_decimal(v)?));
    }
    Ok(edits)
}

fn apply_all(inv: &mut Invoice, item_id: &str, edits: Vec<ItemEdit>) {
    for e in edits {
        inv.items = apply_item_edit(&inv.items, item_id, e);
    }
}

fn find_item<'a>(inv: &Invoice, sub: &'a clap::ArgMatches) -> Result<&'a str> {
    let item_id = id_arg(sub, "item")?;
    if !inv.items.iter().any(|i| i.id == item_id) {
        bail!("Item '{}' not found on invoice {}", item_id, inv.id);
    }
    Ok(item_id)
}

pub fn add(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<(Invoice, String)> {
    let mut inv = load_owned(store, user, id_arg(sub, "invoice")?)?;
    let item = new_item();
    let item_id = item.id.clone();
    inv.items.push(item);
    apply_all(&mut inv, &item_id, edits_from(sub)?);
    Ok((save(store, &inv)?, item_id))
}

pub fn set(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<Invoice> {
    let mut inv = load_owned(store, user, id_arg(sub, "invoice")?)?;
    let item_id = find_item(&inv, sub)?;
    apply_all(&mut inv, item_id, edits_from(sub)?);
    save(store, &inv)
}

pub fn remove(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<Invoice> {
    let mut inv = load_owned(store, user, id_arg(sub, "invoice")?)?;
    let item_id = find_item(&inv, sub)?;
    inv.items = remove_item(&inv.items, item_id);
    save(store, &inv)
}
