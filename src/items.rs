// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Line items and their text-blob representation.
//!
//! Invoices keep their items as a JSON array inside a single text column.
//! [`serialize_items`] and [`deserialize_items`] are the only places that
//! know about that layout. Reading never fails: a blob that cannot be parsed
//! loads as an empty list so an old or damaged record still opens. A single
//! oddly typed field is coerced instead of failing the whole blob.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::totals::compute_line_total;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Rows stored without an id get `item-<position>` on load, see [`try_deserialize_items`].
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(
        default,
        alias = "detalle",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_text"
    )]
    pub label: Option<String>,
    #[serde(
        default,
        alias = "parrafo",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_text"
    )]
    pub detail: Option<String>,
    #[serde(default, alias = "monto", deserialize_with = "lenient_amount")]
    pub unit_amount: Decimal,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_amount")]
    pub quantity: Decimal,
    /// Derived from `unit_amount * quantity` by [`apply_item_edit`]; never set by hand.
    #[serde(default, alias = "importe", deserialize_with = "lenient_amount")]
    pub line_total: Decimal,
}

/// A single field change on a line item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    UnitAmount(Decimal),
    Quantity(Decimal),
    Label(Option<String>),
    Detail(Option<String>),
}

impl ItemEdit {
    fn touches_factor(&self) -> bool {
        matches!(self, ItemEdit::UnitAmount(_) | ItemEdit::Quantity(_))
    }
}

pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Blank row as added from the editor: one unit at zero.
pub fn new_item() -> LineItem {
    LineItem {
        id: new_item_id(),
        label: Some(String::new()),
        detail: Some(String::new()),
        unit_amount: Decimal::ZERO,
        quantity: Decimal::ONE,
        line_total: Decimal::ZERO,
    }
}

/// Return a copy of `items` with one field of item `item_id` changed.
///
/// Changing the unit amount or quantity also recomputes the line total.
/// Only the first item with a matching id is touched and order is kept.
/// An unknown id leaves the sequence as it was.
pub fn apply_item_edit(items: &[LineItem], item_id: &str, edit: ItemEdit) -> Vec<LineItem> {
    let mut out = items.to_vec();
    if let Some(item) = out.iter_mut().find(|i| i.id == item_id) {
        let recompute = edit.touches_factor();
        match edit {
            ItemEdit::UnitAmount(v) => item.unit_amount = v,
            ItemEdit::Quantity(v) => item.quantity = v,
            ItemEdit::Label(v) => item.label = v,
            ItemEdit::Detail(v) => item.detail = v,
        }
        if recompute {
            item.line_total = compute_line_total(item.unit_amount, item.quantity);
        }
    }
    out
}

/// Drop item `item_id`; unknown ids are ignored.
pub fn remove_item(items: &[LineItem], item_id: &str) -> Vec<LineItem> {
    items.iter().filter(|i| i.id != item_id).cloned().collect()
}

pub fn serialize_items(items: &[LineItem]) -> String {
    // A Vec of plain structs with string keys cannot fail to serialize.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Strict parse, for callers that need to know the blob was bad.
///
/// Items without an id are named after their 1-based position so the same
/// blob always yields the same ids until it is saved again.
pub fn try_deserialize_items(text: &str) -> serde_json::Result<Vec<LineItem>> {
    let mut items: Vec<LineItem> = serde_json::from_str(text)?;
    for (pos, item) in items.iter_mut().enumerate() {
        if item.id.is_empty() {
            item.id = format!("item-{}", pos + 1);
        }
    }
    Ok(items)
}

pub fn deserialize_items(text: Option<&str>) -> Vec<LineItem> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Vec::new();
    };
    match try_deserialize_items(text) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "unreadable items blob, loading as empty");
            Vec::new()
        }
    }
}

/// Numeric value of a loosely typed JSON field; anything non-numeric is zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => amount_from_text(&n.to_string()),
        Value::String(s) => amount_from_text(s),
        _ => Decimal::ZERO,
    }
}

/// Parse a stored amount, falling back to zero.
pub fn amount_from_text(s: &str) -> Decimal {
    let s = s.trim();
    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

/// Text of a loosely typed JSON field; numbers and booleans are kept as text.
fn coerce_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_text(Value::deserialize(deserializer)?))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = coerce_text(Value::deserialize(deserializer)?).unwrap_or_default();
    Ok(id.trim().to_string())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}
