// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Invoice totals engine.
//!
//! Everything here is pure: the same items, discount and tax switch always
//! produce the same [`Totals`]. Nothing is cached between calls, so callers
//! can recompute on every edit and once more right before persisting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::LineItem;

/// ITBIS rate (18%) applied to the discounted subtotal of a taxed invoice.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Monetary aggregates of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn discounted_subtotal(&self) -> Decimal {
        self.subtotal.saturating_sub(self.discount)
    }
}

/// Rate in effect for the given tax switch.
pub fn tax_rate(tax_included: bool) -> Decimal {
    if tax_included { TAX_RATE } else { Decimal::ZERO }
}

/// Line total for one item. Not rounded; negative factors propagate.
pub fn compute_line_total(unit_amount: Decimal, quantity: Decimal) -> Decimal {
    unit_amount.saturating_mul(quantity)
}

/// Derive subtotal, tax and total from the live item list.
///
/// The discount is a flat amount taken off the subtotal before tax. A
/// negative discount acts as a surcharge and is not rejected; an empty item
/// list with a discount yields a negative total.
pub fn compute_totals(items: &[LineItem], discount: Decimal, tax_included: bool) -> Totals {
    let subtotal = items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total));
    let discounted = subtotal.saturating_sub(discount);
    let tax = discounted.saturating_mul(tax_rate(tax_included));
    let total = discounted.saturating_add(tax);
    Totals {
        subtotal,
        discount,
        tax,
        total,
    }
}
