// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use fintrack::error::TableError;
use fintrack::models::{
    NewTransaction, Transaction, TransactionId, TransactionPatch, TransactionType,
};
use fintrack::month::YearMonth;
use fintrack::store::{DateRange, SqliteTable, TableQuery, TransactionTable};
use std::cell::Cell;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One-based month, as written in dates.
pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth {
        year,
        month: month - 1,
    }
}

pub fn new_tx(r#type: TransactionType, d: &str, category: &str, amount: &str) -> NewTransaction {
    NewTransaction {
        r#type,
        category: category.into(),
        amount: amount.into(),
        description: None,
        date: date(d),
        receipt_url: None,
    }
}

pub fn expense(d: &str, category: &str, amount: &str) -> NewTransaction {
    new_tx(TransactionType::Expense, d, category, amount)
}

pub fn income(d: &str, category: &str, amount: &str) -> NewTransaction {
    new_tx(TransactionType::Income, d, category, amount)
}

/// SQLite table that can be told to fail reads or writes.
pub struct FlakyTable {
    pub inner: SqliteTable,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub selects: Cell<usize>,
    /// Fails only the select with this 1-based sequence number.
    pub fail_on_select: Cell<Option<usize>>,
}

impl FlakyTable {
    pub fn new() -> Self {
        Self {
            inner: SqliteTable::open_in_memory().unwrap(),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
            selects: Cell::new(0),
            fail_on_select: Cell::new(None),
        }
    }

    pub fn seed(&self, rows: &[NewTransaction]) -> Vec<Transaction> {
        rows.iter().map(|r| self.inner.insert(r).unwrap()).collect()
    }

    fn read_gate(&self) -> Result<(), TableError> {
        if self.fail_reads.get() {
            return Err(TableError::Unavailable("network down".into()));
        }
        Ok(())
    }

    fn write_gate(&self) -> Result<(), TableError> {
        if self.fail_writes.get() {
            return Err(TableError::Unavailable("network down".into()));
        }
        Ok(())
    }
}

impl TransactionTable for FlakyTable {
    fn select(&self, query: &TableQuery) -> Result<Vec<Transaction>, TableError> {
        let n = self.selects.get() + 1;
        self.selects.set(n);
        if self.fail_on_select.get() == Some(n) {
            return Err(TableError::Unavailable("network down".into()));
        }
        self.read_gate()?;
        self.inner.select(query)
    }

    fn select_dates(&self) -> Result<Vec<NaiveDate>, TableError> {
        self.read_gate()?;
        self.inner.select_dates()
    }

    fn count(&self, range: Option<DateRange>) -> Result<u64, TableError> {
        self.read_gate()?;
        self.inner.count(range)
    }

    fn insert(&self, tx: &NewTransaction) -> Result<Transaction, TableError> {
        self.write_gate()?;
        self.inner.insert(tx)
    }

    fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, TableError> {
        self.write_gate()?;
        self.inner.update(id, patch)
    }

    fn delete(&self, id: TransactionId) -> Result<bool, TableError> {
        self.write_gate()?;
        self.inner.delete(id)
    }

    fn delete_all(&self) -> Result<u64, TableError> {
        self.write_gate()?;
        self.inner.delete_all()
    }
}
