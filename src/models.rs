// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::{LineItem, serialize_items};
use crate::totals::{Totals, compute_totals};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "pago")]
    Paid,
    #[serde(rename = "rechazado")]
    Rejected,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pendiente",
            InvoiceStatus::Paid => "pago",
            InvoiceStatus::Rejected => "rechazado",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Ok(InvoiceStatus::Pending),
            "pago" | "paid" => Ok(InvoiceStatus::Paid),
            "rechazado" | "rejected" => Ok(InvoiceStatus::Rejected),
            other => Err(anyhow!(
                "Unknown status '{}' (use pendiente|pago|rechazado)",
                other
            )),
        }
    }
}

/// Currency label printed next to amounts. No conversion happens between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "RD$")]
    Peso,
    #[serde(rename = "US$")]
    Dollar,
}

impl Currency {
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Peso => "RD$",
            Currency::Dollar => "US$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RD$" | "DOP" | "RD" => Ok(Currency::Peso),
            "US$" | "USD" | "US" => Ok(Currency::Dollar),
            other => Err(anyhow!("Unknown currency '{}' (use RD$|US$)", other)),
        }
    }
}

/// An invoice as loaded from the store, with its items already parsed.
///
/// `subtotal`, `tax` and `total` are the snapshot written at the last save.
/// The live values always come from [`Invoice::totals`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: String,
    pub owner: String,
    pub client: String,
    pub tax_id: String,
    pub receipt: String,
    pub payment_term: String,
    pub note: String,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub invoice_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub discount: Decimal,
    pub tax_included: bool,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub trashed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Invoice {
    pub fn totals(&self) -> Totals {
        compute_totals(&self.items, self.discount, self.tax_included)
    }
}

/// Full set of persisted columns for one invoice, ready to hand to a store.
///
/// Saving always overwrites every column; there is no partial save.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFields {
    pub owner: String,
    pub client: String,
    pub tax_id: String,
    pub receipt: String,
    pub payment_term: String,
    pub note: String,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub invoice_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub items: String,
    pub discount: Decimal,
    pub tax_included: bool,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub trashed: bool,
}

impl InvoiceFields {
    /// Defaults for a freshly created invoice. ITBIS is off until asked for.
    pub fn placeholder(owner: &str, currency: Currency) -> Self {
        Self {
            owner: owner.to_string(),
            client: "Nuevo Cliente".to_string(),
            tax_id: String::new(),
            receipt: "Sin comprobante".to_string(),
            payment_term: String::new(),
            note: String::new(),
            currency,
            status: InvoiceStatus::Pending,
            invoice_date: None,
            payment_date: None,
            items: serialize_items(&[]),
            discount: Decimal::ZERO,
            tax_included: false,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            trashed: false,
        }
    }

    /// Persistable values for `invoice` with freshly computed totals.
    pub fn ready_to_save(invoice: &Invoice) -> Self {
        let totals = invoice.totals();
        Self {
            owner: invoice.owner.clone(),
            client: invoice.client.clone(),
            tax_id: invoice.tax_id.clone(),
            receipt: invoice.receipt.clone(),
            payment_term: invoice.payment_term.clone(),
            note: invoice.note.clone(),
            currency: invoice.currency,
            status: invoice.status,
            invoice_date: invoice.invoice_date,
            payment_date: invoice.payment_date,
            items: serialize_items(&invoice.items),
            discount: invoice.discount,
            tax_included: invoice.tax_included,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            trashed: invoice.trashed,
        }
    }

    /// Copy of `source` owned by `owner`.
    ///
    /// Invoice date and payment term start blank and the copy is never in
    /// the trash. Items keep their ids; they are only unique per invoice.
    pub fn duplicate_of(source: &Invoice, owner: &str) -> Self {
        let mut fields = Self::ready_to_save(source);
        fields.owner = owner.to_string();
        fields.invoice_date = None;
        fields.payment_term = String::new();
        fields.trashed = false;
        fields
    }
}
