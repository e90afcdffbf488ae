// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Invoice;
use crate::session::{SessionProvider, require_user};
use crate::store::{ListFilter, RecordStore, Sort, SortOrder, SqliteStore};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, session: &dyn SessionProvider, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("invoices", sub)) => export_invoices(conn, session, sub),
        _ => Ok(()),
    }
}

const HEADERS: [&str; 14] = [
    "id", "created", "receipt", "client", "tax_id", "status", "currency", "term", "subtotal",
    "discount", "tax", "total", "note", "items",
];

fn record(inv: &Invoice) -> [String; 14] {
    [
        inv.id.clone(),
        inv.created_at.to_string(),
        inv.receipt.clone(),
        inv.client.clone(),
        inv.tax_id.clone(),
        inv.status.to_string(),
        inv.currency.to_string(),
        inv.payment_term.clone(),
        inv.subtotal.to_string(),
        inv.discount.to_string(),
        inv.tax.to_string(),
        inv.total.to_string(),
        inv.note.clone(),
        inv.items.len().to_string(),
    ]
}

fn export_invoices(conn: &Connection, session: &dyn SessionProvider, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    let out = sub.get_one::<String>("out").context("Missing --out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let user = require_user(session)?;
    let store = SqliteStore::new(conn);
    let filter = ListFilter {
        trashed: sub.get_flag("trash"),
        owner: Some(user.id),
        ..ListFilter::default()
    };
    let sort = Sort {
        order: SortOrder::Asc,
        ..Sort::default()
    };
    let invoices = store.list(&filter, sort)?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(HEADERS)?;
        for inv in &invoices {
            wtr.write_record(record(inv))?;
        }
        wtr.flush()?;
    } else {
        let rows: Vec<_> = invoices
            .iter()
            .map(|inv| {
                json!({
                    "id": inv.id, "created": inv.created_at.to_string(), "receipt": inv.receipt,
                    "client": inv.client, "tax_id": inv.tax_id, "status": inv.status,
                    "currency": inv.currency, "term": inv.payment_term,
                    "subtotal": inv.subtotal.to_string(), "discount": inv.discount.to_string(),
                    "tax": inv.tax.to_string(), "total": inv.total.to_string(),
                    "note": inv.note, "items": inv.items,
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    println!("Exported {} invoices to {}", invoices.len(), out);
    Ok(())
}
