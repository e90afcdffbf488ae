// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Billfold", "billfold"));

/// Database file: `over` when given (the `--db` flag or `BILLFOLD_DB`),
/// otherwise `billfold.sqlite` in the platform data dir.
pub fn db_path(over: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = over {
        if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(p.to_path_buf());
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("billfold.sqlite"))
}

pub fn open_or_init(over: Option<&Path>) -> Result<Connection> {
    let path = db_path(over)?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- amounts are decimal text; items is a JSON array blob
    CREATE TABLE IF NOT EXISTS invoices(
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        client TEXT NOT NULL DEFAULT '',
        tax_id TEXT NOT NULL DEFAULT '',
        receipt TEXT NOT NULL DEFAULT '',
        payment_term TEXT NOT NULL DEFAULT '',
        note TEXT NOT NULL DEFAULT '',
        currency TEXT NOT NULL DEFAULT 'RD$',
        status TEXT NOT NULL DEFAULT 'pendiente',
        invoice_date TEXT,
        payment_date TEXT,
        items TEXT,
        discount TEXT NOT NULL DEFAULT '0',
        tax_included INTEGER NOT NULL DEFAULT 0,
        subtotal TEXT NOT NULL DEFAULT '0',
        tax TEXT NOT NULL DEFAULT '0',
        total TEXT NOT NULL DEFAULT '0',
        trashed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_invoices_owner_trashed ON invoices(owner, trashed);
    "#,
    )?;
    Ok(())
}
