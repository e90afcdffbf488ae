// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record storage for invoices.
//!
//! [`RecordStore`] is the narrow get/list/create/update/delete surface the
//! rest of the crate talks to. [`SqliteStore`] implements it on top of the
//! `invoices` table created by [`crate::db::init_schema`].

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::items::{amount_from_text, deserialize_items};
use crate::models::{Currency, Invoice, InvoiceFields, InvoiceStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invoice '{0}' not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Receipt,
    Client,
    Status,
    #[default]
    Created,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Receipt => "receipt COLLATE NOCASE",
            SortField::Client => "client COLLATE NOCASE",
            SortField::Status => "status",
            SortField::Created => "created_at",
        }
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(SortField::Receipt),
            "client" => Ok(SortField::Client),
            "status" => Ok(SortField::Status),
            "created" => Ok(SortField::Created),
            other => Err(anyhow::anyhow!(
                "Unknown sort field '{}' (use receipt|client|status|created)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(anyhow::anyhow!("Unknown order '{}' (use asc|desc)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Which records a listing returns.
///
/// `client` and `receipt` are case-insensitive substring matches. A record
/// with an empty value in a filtered column never matches a non-empty needle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub trashed: bool,
    pub owner: Option<String>,
    pub client: Option<String>,
    pub receipt: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        fn contains(hay: &str, needle: &Option<String>) -> bool {
            match needle {
                Some(n) => hay.to_lowercase().contains(&n.to_lowercase()),
                None => true,
            }
        }
        invoice.trashed == self.trashed
            && self.owner.as_ref().is_none_or(|o| &invoice.owner == o)
            && contains(&invoice.client, &self.client)
            && contains(&invoice.receipt, &self.receipt)
    }
}

pub trait RecordStore {
    fn get(&self, id: &str) -> Result<Invoice>;
    fn list(&self, filter: &ListFilter, sort: Sort) -> Result<Vec<Invoice>>;
    fn create(&self, fields: &InvoiceFields) -> Result<Invoice>;
    /// Overwrite every column of `id`.
    fn update(&self, id: &str, fields: &InvoiceFields) -> Result<Invoice>;
    /// Flip only the soft-delete flag.
    fn set_trashed(&self, id: &str, trashed: bool) -> Result<Invoice>;
    fn delete(&self, id: &str) -> Result<()>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

const COLUMNS: &str = "id, owner, client, tax_id, receipt, payment_term, note, currency, status, \
     invoice_date, payment_date, items, discount, tax_included, subtotal, tax, total, trashed, \
     created_at, updated_at";

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_invoice(r: &Row<'_>) -> rusqlite::Result<Invoice> {
        let id: String = r.get(0)?;
        let currency: String = r.get(7)?;
        let status: String = r.get(8)?;
        let items: Option<String> = r.get(11)?;
        let amount = |idx: usize| -> rusqlite::Result<rust_decimal::Decimal> {
            let s: Option<String> = r.get(idx)?;
            Ok(s.as_deref().map(amount_from_text).unwrap_or_default())
        };
        Ok(Invoice {
            owner: r.get(1)?,
            client: r.get(2)?,
            tax_id: r.get(3)?,
            receipt: r.get(4)?,
            payment_term: r.get(5)?,
            note: r.get(6)?,
            currency: currency.parse().unwrap_or_else(|_| {
                warn!(%id, %currency, "unknown currency label, using default");
                Currency::default()
            }),
            status: status.parse().unwrap_or_else(|_| {
                warn!(%id, %status, "unknown status, using default");
                InvoiceStatus::default()
            }),
            invoice_date: lenient_date(r.get(9)?),
            payment_date: lenient_date(r.get(10)?),
            items: deserialize_items(items.as_deref()),
            discount: amount(12)?,
            tax_included: r.get(13)?,
            subtotal: amount(14)?,
            tax: amount(15)?,
            total: amount(16)?,
            trashed: r.get(17)?,
            created_at: r.get(18)?,
            updated_at: r.get(19)?,
            id,
        })
    }
}

fn lenient_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

impl RecordStore for SqliteStore<'_> {
    fn get(&self, id: &str) -> Result<Invoice> {
        let sql = format!("SELECT {COLUMNS} FROM invoices WHERE id=?1");
        self.conn
            .query_row(&sql, params![id], Self::row_to_invoice)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self, filter: &ListFilter, sort: Sort) -> Result<Vec<Invoice>> {
        let dir = match sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM invoices WHERE trashed=?1 AND (?2 IS NULL OR owner=?2) \
             ORDER BY {} {dir}, rowid {dir}",
            sort.field.column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![filter.trashed, filter.owner.as_deref()],
            Self::row_to_invoice,
        )?;
        let mut data = Vec::new();
        for row in rows {
            let inv = row?;
            if filter.matches(&inv) {
                data.push(inv);
            }
        }
        debug!(count = data.len(), ?sort, "listed invoices");
        Ok(data)
    }

    fn create(&self, fields: &InvoiceFields) -> Result<Invoice> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().naive_utc();
        self.conn.execute(
            "INSERT INTO invoices(id, owner, client, tax_id, receipt, payment_term, note, currency, status,
                invoice_date, payment_date, items, discount, tax_included, subtotal, tax, total, trashed,
                created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?19)",
            params![
                id,
                fields.owner,
                fields.client,
                fields.tax_id,
                fields.receipt,
                fields.payment_term,
                fields.note,
                fields.currency.label(),
                fields.status.as_str(),
                fields.invoice_date.map(|d| d.to_string()),
                fields.payment_date.map(|d| d.to_string()),
                fields.items,
                fields.discount.to_string(),
                fields.tax_included,
                fields.subtotal.to_string(),
                fields.tax.to_string(),
                fields.total.to_string(),
                fields.trashed,
                now,
            ],
        )?;
        info!(%id, owner = %fields.owner, "created invoice");
        self.get(&id)
    }

    fn update(&self, id: &str, fields: &InvoiceFields) -> Result<Invoice> {
        let changed = self.conn.execute(
            "UPDATE invoices SET owner=?2, client=?3, tax_id=?4, receipt=?5, payment_term=?6, note=?7,
                currency=?8, status=?9, invoice_date=?10, payment_date=?11, items=?12, discount=?13,
                tax_included=?14, subtotal=?15, tax=?16, total=?17, trashed=?18, updated_at=?19
             WHERE id=?1",
            params![
                id,
                fields.owner,
                fields.client,
                fields.tax_id,
                fields.receipt,
                fields.payment_term,
                fields.note,
                fields.currency.label(),
                fields.status.as_str(),
                fields.invoice_date.map(|d| d.to_string()),
                fields.payment_date.map(|d| d.to_string()),
                fields.items,
                fields.discount.to_string(),
                fields.tax_included,
                fields.subtotal.to_string(),
                fields.tax.to_string(),
                fields.total.to_string(),
                fields.trashed,
                Utc::now().naive_utc(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(%id, total = %fields.total, "updated invoice");
        self.get(id)
    }

    fn set_trashed(&self, id: &str, trashed: bool) -> Result<Invoice> {
        let changed = self.conn.execute(
            "UPDATE invoices SET trashed=?2, updated_at=?3 WHERE id=?1",
            params![id, trashed, Utc::now().naive_utc()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(%id, trashed, "changed trash flag");
        self.get(id)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM invoices WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(%id, "deleted invoice");
        Ok(())
    }
}
