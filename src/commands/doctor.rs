// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::items::{amount_from_text, try_deserialize_items};
use crate::session::{SessionProvider, require_user};
use crate::totals::{compute_line_total, compute_totals};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection, session: &dyn SessionProvider) -> Result<()> {
    let user = require_user(session)?;
    let issues = collect_issues(conn, &user.id)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|i| vec![i.kind.into(), i.detail]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Problems in the invoices owned by `owner`, trash included.
pub fn collect_issues(conn: &Connection, owner: &str) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    let mut stmt = conn.prepare(
        "SELECT id, items, discount, tax_included, subtotal, tax, total FROM invoices
         WHERE owner=?1 ORDER BY created_at, rowid",
    )?;
    let mut cur = stmt.query(params![owner])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let blob: Option<String> = r.get(1)?;
        let discount: String = r.get(2)?;
        let tax_included: bool = r.get(3)?;
        let stored: [String; 3] = [r.get(4)?, r.get(5)?, r.get(6)?];

        // 1) Items blob that would load as an empty list
        let items = match blob.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            None => Vec::new(),
            Some(b) => match try_deserialize_items(b) {
                Ok(items) => items,
                Err(e) => {
                    issues.push(Issue {
                        kind: "items_unreadable",
                        detail: format!("{}: {}", id, e),
                    });
                    continue;
                }
            },
        };

        // 2) Line totals that no longer match their factors
        for item in &items {
            let expected = compute_line_total(item.unit_amount, item.quantity);
            if item.line_total != expected {
                issues.push(Issue {
                    kind: "line_total_drift",
                    detail: format!("{} item {}: {} != {}", id, item.id, item.line_total, expected),
                });
            }
        }

        // 3) Snapshot totals out of date
        let fresh = compute_totals(&items, amount_from_text(&discount), tax_included);
        let [subtotal, tax, total] = stored.map(|s| amount_from_text(&s));
        if (subtotal, tax, total) != (fresh.subtotal, fresh.tax, fresh.total) {
            issues.push(Issue {
                kind: "stale_totals",
                detail: format!("{}: stored total {} vs computed {}", id, total, fresh.total),
            });
        }
    }
    Ok(issues)
}
