// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::AppConfig;
use crate::store::SqliteTable;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;

pub fn open_or_init(config: &AppConfig) -> Result<SqliteTable> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir {}", config.data_dir.display()))?;
    let path = config.db_path();
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    let table = SqliteTable::new(conn).context("Initialize schema")?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(table)
}

pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL CHECK(type IN ('expense','income')),
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        description TEXT,
        date TEXT NOT NULL,
        receipt_url TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, created_at);
    "#,
    )
}
