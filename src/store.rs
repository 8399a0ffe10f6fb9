// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transactions table every component reads and writes.

use crate::error::TableError;
use crate::models::{NewTransaction, Transaction, TransactionId, TransactionPatch, TransactionType};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

/// Inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn year(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or_default();
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// Select parameters. Rows always come back newest first:
/// `date DESC, created_at DESC`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub range: Option<DateRange>,
    pub page: Option<Page>,
}

impl TableQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_range(range: DateRange) -> Self {
        Self {
            range: Some(range),
            page: None,
        }
    }

    pub fn paged(mut self, offset: usize, limit: usize) -> Self {
        self.page = Some(Page { offset, limit });
        self
    }
}

/// Row storage for transactions. Implementations may be remote; every call
/// is a potential failure point.
pub trait TransactionTable {
    fn select(&self, query: &TableQuery) -> Result<Vec<Transaction>, TableError>;

    /// Date column of every row, for availability indexes.
    fn select_dates(&self) -> Result<Vec<NaiveDate>, TableError>;

    fn count(&self, range: Option<DateRange>) -> Result<u64, TableError>;

    fn insert(&self, tx: &NewTransaction) -> Result<Transaction, TableError>;

    /// `Ok(None)` when no row has this id.
    fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, TableError>;

    /// `Ok(false)` when no row has this id.
    fn delete(&self, id: TransactionId) -> Result<bool, TableError>;

    fn delete_all(&self) -> Result<u64, TableError>;
}

const COLUMNS: &str = "id, type, category, amount, description, date, receipt_url, created_at";

pub struct SqliteTable {
    conn: Connection,
}

impl SqliteTable {
    pub fn new(conn: Connection) -> Result<Self, TableError> {
        crate::db::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, TableError> {
        Self::new(Connection::open_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn find(&self, id: i64) -> Result<Option<Transaction>, TableError> {
        let sql = format!("SELECT {COLUMNS} FROM transactions WHERE id=?1");
        let raw = self
            .conn
            .query_row(&sql, params![id], RawRow::read)
            .optional()?;
        raw.map(RawRow::into_transaction).transpose()
    }
}

struct RawRow {
    id: i64,
    r#type: String,
    category: String,
    amount: String,
    description: Option<String>,
    date: NaiveDate,
    receipt_url: Option<String>,
    created_at: String,
}

impl RawRow {
    fn read(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            r#type: r.get(1)?,
            category: r.get(2)?,
            amount: r.get(3)?,
            description: r.get(4)?,
            date: r.get(5)?,
            receipt_url: r.get(6)?,
            created_at: r.get(7)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction, TableError> {
        let r#type = self
            .r#type
            .parse::<TransactionType>()
            .map_err(|e| TableError::Corrupt {
                id: self.id,
                reason: e.to_string(),
            })?;
        Ok(Transaction {
            id: TransactionId(self.id),
            r#type,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date,
            receipt_url: self.receipt_url,
            created_at: self.created_at,
        })
    }
}

impl TransactionTable for SqliteTable {
    fn select(&self, query: &TableQuery) -> Result<Vec<Transaction>, TableError> {
        let mut sql = format!("SELECT {COLUMNS} FROM transactions WHERE 1=1");
        let mut params_vec: Vec<Value> = Vec::new();

        if let Some(range) = query.range {
            sql.push_str(" AND date >= ? AND date <= ?");
            params_vec.push(Value::Text(range.start.to_string()));
            params_vec.push(Value::Text(range.end.to_string()));
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");
        if let Some(page) = query.page {
            sql.push_str(" LIMIT ? OFFSET ?");
            params_vec.push(Value::Integer(page.limit as i64));
            params_vec.push(Value::Integer(page.offset as i64));
        }

        tracing::debug!(%sql, "select transactions");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params_vec), RawRow::read)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.into_transaction()?);
        }
        Ok(data)
    }

    fn select_dates(&self) -> Result<Vec<NaiveDate>, TableError> {
        let mut stmt = self.conn.prepare("SELECT date FROM transactions")?;
        let rows = stmt.query_map([], |r| r.get::<_, NaiveDate>(0))?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn count(&self, range: Option<DateRange>) -> Result<u64, TableError> {
        let n: i64 = match range {
            Some(r) => self.conn.query_row(
                "SELECT COUNT(*) FROM transactions WHERE date >= ?1 AND date <= ?2",
                params![r.start, r.end],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?,
        };
        Ok(n.max(0) as u64)
    }

    fn insert(&self, tx: &NewTransaction) -> Result<Transaction, TableError> {
        self.conn.execute(
            "INSERT INTO transactions(type, category, amount, description, date, receipt_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                tx.r#type.as_str(),
                tx.category,
                tx.amount,
                tx.description,
                tx.date,
                tx.receipt_url
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.find(id)?.ok_or(TableError::Corrupt {
            id,
            reason: "inserted row vanished".into(),
        })
    }

    fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, TableError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params_vec: Vec<Value> = Vec::new();

        if let Some(t) = patch.r#type {
            sets.push("type=?");
            params_vec.push(Value::Text(t.as_str().into()));
        }
        if let Some(c) = &patch.category {
            sets.push("category=?");
            params_vec.push(Value::Text(c.clone()));
        }
        if let Some(a) = &patch.amount {
            sets.push("amount=?");
            params_vec.push(Value::Text(a.clone()));
        }
        if let Some(d) = &patch.description {
            sets.push("description=?");
            params_vec.push(d.clone().map(Value::Text).unwrap_or(Value::Null));
        }
        if let Some(d) = patch.date {
            sets.push("date=?");
            params_vec.push(Value::Text(d.to_string()));
        }
        if let Some(u) = &patch.receipt_url {
            sets.push("receipt_url=?");
            params_vec.push(u.clone().map(Value::Text).unwrap_or(Value::Null));
        }
        if sets.is_empty() {
            return self.find(id.0);
        }

        let sql = format!("UPDATE transactions SET {} WHERE id=?", sets.join(", "));
        params_vec.push(Value::Integer(id.0));
        let changed = self.conn.execute(&sql, params_from_iter(params_vec))?;
        if changed == 0 {
            return Ok(None);
        }
        self.find(id.0)
    }

    fn delete(&self, id: TransactionId) -> Result<bool, TableError> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id.0])?;
        Ok(n > 0)
    }

    fn delete_all(&self) -> Result<u64, TableError> {
        let n = self.conn.execute("DELETE FROM transactions", [])?;
        Ok(n as u64)
    }
}
