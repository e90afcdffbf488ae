// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::items::LineItem;
use crate::models::{Currency, Invoice, InvoiceFields};
use crate::session::{SessionProvider, User, require_user};
use crate::store::{ListFilter, RecordStore, Sort, SqliteStore, StoreError};
use crate::totals::{TAX_RATE, Totals};
use crate::utils::{
    fmt_date, fmt_money, get_default_currency, maybe_print_json, paginate, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, session: &dyn SessionProvider, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let user = require_user(session)?;
    match m.subcommand() {
        Some(("new", _)) => {
            let inv = create(&store, &user, get_default_currency(conn)?)?;
            println!("Created invoice {}", inv.id);
        }
        Some(("list", sub)) => list(&store, &user, sub)?,
        Some(("show", sub)) => show(&store, &user, sub)?,
        Some(("set", sub)) => {
            let inv = set_fields(&store, &user, sub)?;
            println!(
                "Saved {} (total {})",
                inv.id,
                fmt_money(&inv.total, inv.currency)
            );
        }
        Some(("dup", sub)) => {
            let src = id_arg(sub, "id")?;
            let inv = duplicate(&store, &user, src)?;
            println!("Duplicated {} as {}", src, inv.id);
        }
        Some(("trash", sub)) => {
            let inv = set_trashed(&store, &user, id_arg(sub, "id")?, true)?;
            println!("Moved {} to the trash", inv.id);
        }
        Some(("restore", sub)) => {
            let inv = set_trashed(&store, &user, id_arg(sub, "id")?, false)?;
            println!("Restored {}", inv.id);
        }
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            delete(&store, &user, id)?;
            println!("Deleted invoice {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn id_arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing <{}>", name))
}

/// Load `id`, treating other users' invoices as missing.
pub fn load_owned(store: &dyn RecordStore, user: &User, id: &str) -> Result<Invoice> {
    let inv = store.get(id)?;
    if inv.owner != user.id {
        return Err(StoreError::NotFound(id.to_string()).into());
    }
    Ok(inv)
}

/// Overwrite the stored record with `invoice` and fresh totals.
pub fn save(store: &dyn RecordStore, invoice: &Invoice) -> Result<Invoice> {
    Ok(store.update(&invoice.id, &InvoiceFields::ready_to_save(invoice))?)
}

pub fn create(store: &dyn RecordStore, user: &User, currency: Currency) -> Result<Invoice> {
    Ok(store.create(&InvoiceFields::placeholder(&user.id, currency))?)
}

pub fn duplicate(store: &dyn RecordStore, user: &User, id: &str) -> Result<Invoice> {
    let src = load_owned(store, user, id)?;
    let copy = store.create(&InvoiceFields::duplicate_of(&src, &user.id))?;
    info!(source = %src.id, copy = %copy.id, "duplicated invoice");
    Ok(copy)
}

pub fn set_trashed(store: &dyn RecordStore, user: &User, id: &str, trashed: bool) -> Result<Invoice> {
    load_owned(store, user, id)?;
    Ok(store.set_trashed(id, trashed)?)
}

pub fn delete(store: &dyn RecordStore, user: &User, id: &str) -> Result<()> {
    load_owned(store, user, id)?;
    Ok(store.delete(id)?)
}

pub fn set_fields(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<Invoice> {
    let mut inv = load_owned(store, user, id_arg(sub, "id")?)?;
    let text = |name: &str| sub.get_one::<String>(name).map(|s| s.trim().to_string());

    if let Some(v) = text("client") {
        inv.client = v;
    }
    if let Some(v) = text("tax-id") {
        inv.tax_id = v;
    }
    if let Some(v) = text("receipt") {
        inv.receipt = v;
    }
    if let Some(v) = text("term") {
        inv.payment_term = v;
    }
    if let Some(v) = text("note") {
        inv.note = v;
    }
    if let Some(v) = text("currency") {
        inv.currency = v.parse()?;
    }
    if let Some(v) = text("status") {
        inv.status = v.parse()?;
    }
    if let Some(v) = text("discount") {
        inv.discount = parse_decimal(&v)?;
    }
    if sub.get_flag("tax") {
        inv.tax_included = true;
    }
    if sub.get_flag("no-tax") {
        inv.tax_included = false;
    }
    // An empty value clears a date
    if let Some(v) = text("date") {
        inv.invoice_date = if v.is_empty() { None } else { Some(parse_date(&v)?) };
    }
    if let Some(v) = text("paid-on") {
        inv.payment_date = if v.is_empty() { None } else { Some(parse_date(&v)?) };
    }
    save(store, &inv)
}

#[derive(Debug, Serialize)]
pub struct InvoiceRow {
    pub id: String,
    pub created: String,
    pub receipt: String,
    pub client: String,
    pub status: String,
    pub currency: Currency,
    pub total: Decimal,
}

impl From<&Invoice> for InvoiceRow {
    fn from(inv: &Invoice) -> Self {
        Self {
            id: inv.id.clone(),
            created: inv.created_at.format("%Y-%m-%d %H:%M").to_string(),
            receipt: inv.receipt.clone(),
            client: inv.client.clone(),
            status: inv.status.to_string(),
            currency: inv.currency,
            total: inv.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoicePage {
    pub page: usize,
    pub pages: usize,
    pub matched: usize,
    pub rows: Vec<InvoiceRow>,
}

pub fn query_rows(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<InvoicePage> {
    let non_empty = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let filter = ListFilter {
        trashed: sub.get_flag("trash"),
        owner: Some(user.id.clone()),
        client: non_empty("client"),
        receipt: non_empty("receipt"),
    };
    let sort = Sort {
        field: id_arg(sub, "sort")?.parse()?,
        order: id_arg(sub, "order")?.parse()?,
    };
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);
    let per_page = sub.get_one::<usize>("per-page").copied().unwrap_or(10);

    let all = store.list(&filter, sort)?;
    let matched = all.len();
    let (slice, pages) = paginate(all, page, per_page);
    Ok(InvoicePage {
        page,
        pages,
        matched,
        rows: slice.iter().map(InvoiceRow::from).collect(),
    })
}

fn list(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, user, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data.rows)? {
        return Ok(());
    }
    if data.rows.is_empty() {
        println!("No invoices");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.created.clone(),
                r.receipt.clone(),
                r.client.clone(),
                r.status.clone(),
                fmt_money(&r.total, r.currency),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Created", "Receipt", "Client", "Status", "Total"], rows)
    );
    println!("Page {}/{} ({} invoices)", data.page, data.pages.max(1), data.matched);
    Ok(())
}

#[derive(Serialize)]
struct InvoiceView<'a> {
    #[serde(flatten)]
    invoice: &'a Invoice,
    live_totals: Totals,
}

fn show(store: &dyn RecordStore, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let inv = load_owned(store, user, id_arg(sub, "id")?)?;
    let totals = inv.totals();
    let view = InvoiceView {
        invoice: &inv,
        live_totals: totals,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }

    let ccy = inv.currency;
    let header = vec![
        vec!["Client".to_string(), inv.client.clone()],
        vec!["RNC".to_string(), inv.tax_id.clone()],
        vec!["Receipt".to_string(), inv.receipt.clone()],
        vec!["Date".to_string(), fmt_date(inv.invoice_date)],
        vec!["Payment term".to_string(), inv.payment_term.clone()],
        vec!["Paid on".to_string(), fmt_date(inv.payment_date)],
        vec!["Status".to_string(), inv.status.to_string()],
        vec!["Trashed".to_string(), inv.trashed.to_string()],
    ];
    println!("{}", pretty_table(&["Invoice", inv.id.as_str()], header));
    println!(
        "{}",
        pretty_table(
            &["Item", "Label", "Detail", "Amount", "Qty", "Line total"],
            item_rows(&inv.items, ccy),
        )
    );

    let rate_label = if inv.tax_included {
        format!("ITBIS {}%", (TAX_RATE * Decimal::ONE_HUNDRED).normalize())
    } else {
        "ITBIS".to_string()
    };
    let summary = vec![
        vec!["Subtotal".to_string(), fmt_money(&totals.subtotal, ccy)],
        vec!["Discount".to_string(), fmt_money(&totals.discount, ccy)],
        vec![rate_label, fmt_money(&totals.tax, ccy)],
        vec!["Total".to_string(), fmt_money(&totals.total, ccy)],
    ];
    println!("{}", pretty_table(&["", ""], summary));
    if !inv.note.is_empty() {
        println!("Note: {}", inv.note);
    }
    Ok(())
}

fn item_rows(items: &[LineItem], ccy: Currency) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.label.clone().unwrap_or_default(),
                i.detail.clone().unwrap_or_default(),
                fmt_money(&i.unit_amount, ccy),
                i.quantity.to_string(),
                fmt_money(&i.line_total, ccy),
            ]
        })
        .collect()
}
