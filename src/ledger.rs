// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Paged, month-scoped access to the transactions table.
//!
//! [`MonthLedger`] keeps the rows loaded so far for the selected month, the
//! month's totals and an availability index. Page loads are split into a
//! request that is issued, run against the table and completed; a request
//! completed after the ledger moved on (newer first page, different month)
//! is dropped without touching the cache.

use crate::availability::AvailabilityIndex;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{StoreError, TableError};
use crate::models::{Transaction, TransactionDraft, TransactionId, TransactionPatch, TransactionType};
use crate::month::{MonthCursor, YearMonth};
use crate::store::{TableQuery, TransactionTable};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

impl MonthTotals {
    /// Sums income and expenses. A sum that leaves the `Decimal` range is
    /// reported against the row that overflowed it.
    pub fn from_rows<'a, I>(rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for t in rows {
            let sum = match t.r#type {
                TransactionType::Income => &mut income,
                TransactionType::Expense => &mut expenses,
            };
            *sum = checked_sum(*sum, t)?;
        }
        let balance = income.checked_sub(expenses).ok_or_else(|| TableError::Corrupt {
            id: 0,
            reason: "balance out of range".into(),
        })?;
        Ok(Self {
            income,
            expenses,
            balance,
        })
    }
}

pub(crate) fn checked_sum(acc: Decimal, t: &Transaction) -> Result<Decimal, TableError> {
    acc.checked_add(t.amount_value())
        .ok_or_else(|| TableError::Corrupt {
            id: t.id.0,
            reason: format!("amount {} overflows the running total", t.amount),
        })
}

fn query_totals(table: &dyn TransactionTable, month: YearMonth) -> Result<MonthTotals, TableError> {
    let rows = table.select(&TableQuery::in_range(month.date_range()))?;
    MonthTotals::from_rows(&rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    First,
    More,
}

/// A page load that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    kind: PageKind,
    generation: u64,
    month: YearMonth,
    query: TableQuery,
}

impl PageRequest {
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn run(&self, table: &dyn TransactionTable) -> Result<Vec<Transaction>, TableError> {
        table.select(&self.query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied { received: usize, appended: usize },
    /// The response belonged to a superseded request and was dropped.
    Stale,
    /// Nothing was requested (already loading, no more pages, or up to date).
    Skipped,
}

#[derive(Debug)]
pub struct MonthLedger {
    cursor: MonthCursor,
    page_size: usize,
    entries: Vec<Transaction>,
    cache_month: Option<YearMonth>,
    has_more: bool,
    totals: MonthTotals,
    availability: AvailabilityIndex,
    loading: bool,
    loading_more: bool,
    generation: u64,
    synced_revision: Option<u64>,
    last_error: Option<String>,
}

impl MonthLedger {
    pub fn new(cursor: MonthCursor) -> Self {
        Self::with_page_size(cursor, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(cursor: MonthCursor, page_size: usize) -> Self {
        Self {
            cursor,
            page_size: page_size.max(1),
            entries: Vec::new(),
            cache_month: None,
            has_more: false,
            totals: MonthTotals::default(),
            availability: AvailabilityIndex::default(),
            loading: false,
            loading_more: false,
            generation: 0,
            synced_revision: None,
            last_error: None,
        }
    }

    pub fn cursor(&self) -> &MonthCursor {
        &self.cursor
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.entries
    }

    /// Month the cached rows belong to, if any page was applied yet.
    pub fn cached_month(&self) -> Option<YearMonth> {
        self.cache_month
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn totals(&self) -> MonthTotals {
        self.totals
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    // ---- paging -------------------------------------------------------

    /// Starts a first-page load for the selected month. Supersedes any page
    /// request still in flight.
    pub fn begin_first_page(&mut self) -> PageRequest {
        self.generation += 1;
        self.loading = true;
        self.loading_more = false;
        self.last_error = None;
        self.synced_revision = Some(self.cursor.revision());
        let month = self.cursor.selected();
        tracing::debug!(%month, generation = self.generation, "first page requested");
        PageRequest {
            kind: PageKind::First,
            generation: self.generation,
            month,
            query: TableQuery::in_range(month.date_range()).paged(0, self.page_size),
        }
    }

    /// Starts loading the next page, or `None` when a load is in flight, no
    /// more pages exist, or the cache is not for the selected month.
    pub fn begin_load_more(&mut self) -> Option<PageRequest> {
        if self.loading || self.loading_more || !self.has_more {
            return None;
        }
        let month = self.cache_month?;
        if month != self.cursor.selected() {
            return None;
        }
        self.loading_more = true;
        let offset = self.entries.len();
        tracing::debug!(%month, offset, "next page requested");
        Some(PageRequest {
            kind: PageKind::More,
            generation: self.generation,
            month,
            query: TableQuery::in_range(month.date_range()).paged(offset, self.page_size),
        })
    }

    /// Applies the result of a page request, unless it went stale meanwhile.
    pub fn complete_page(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Transaction>, TableError>,
    ) -> Result<PageOutcome, StoreError> {
        if request.generation != self.generation {
            tracing::warn!(month = %request.month, "dropping response for superseded request");
            return Ok(PageOutcome::Stale);
        }
        match request.kind {
            PageKind::First => self.loading = false,
            PageKind::More => self.loading_more = false,
        }
        if request.month != self.cursor.selected() {
            tracing::warn!(month = %request.month, "dropping response for a month no longer selected");
            return Ok(PageOutcome::Stale);
        }

        if request.kind == PageKind::More && self.cache_month != Some(request.month) {
            return Ok(PageOutcome::Stale);
        }

        let rows = result.map_err(|e| self.fail(StoreError::Fetch(e)))?;
        let received = rows.len();
        self.has_more = received == self.page_size;

        let appended = match request.kind {
            PageKind::First => {
                self.entries = rows;
                self.cache_month = Some(request.month);
                received
            }
            PageKind::More => {
                let seen: HashSet<TransactionId> = self.entries.iter().map(|t| t.id).collect();
                let before = self.entries.len();
                self.entries
                    .extend(rows.into_iter().filter(|t| !seen.contains(&t.id)));
                self.entries.len() - before
            }
        };
        Ok(PageOutcome::Applied { received, appended })
    }

    /// Replaces the cache and totals with the first page and the sums of the
    /// selected month, then refreshes the availability index. Rows and totals
    /// are committed together; if either query fails neither changes.
    pub fn fetch_first_page(
        &mut self,
        table: &dyn TransactionTable,
    ) -> Result<PageOutcome, StoreError> {
        let request = self.begin_first_page();
        let month = request.month();
        let result = request
            .run(table)
            .and_then(|rows| Ok((rows, query_totals(table, month)?)));
        match result {
            Ok((rows, totals)) => {
                let outcome = self.complete_page(request, Ok(rows))?;
                if let PageOutcome::Applied { .. } = outcome {
                    self.totals = totals;
                    self.refresh_availability_quietly(table);
                }
                Ok(outcome)
            }
            Err(e) => self.complete_page(request, Err(e)),
        }
    }

    pub fn load_more(&mut self, table: &dyn TransactionTable) -> Result<PageOutcome, StoreError> {
        let Some(request) = self.begin_load_more() else {
            return Ok(PageOutcome::Skipped);
        };
        let result = request.run(table);
        self.complete_page(request, result)
    }

    /// Re-fetches when the selected month changed since the last first page.
    pub fn sync(&mut self, table: &dyn TransactionTable) -> Result<PageOutcome, StoreError> {
        if self.synced_revision == Some(self.cursor.revision()) {
            return Ok(PageOutcome::Skipped);
        }
        self.fetch_first_page(table)
    }

    /// Sums every row of the selected month, independent of loaded pages.
    pub fn fetch_totals(&mut self, table: &dyn TransactionTable) -> Result<MonthTotals, StoreError> {
        let month = self.cursor.selected();
        let totals = query_totals(table, month).map_err(|e| self.fail(StoreError::Fetch(e)))?;
        self.totals = totals;
        Ok(totals)
    }

    // ---- writes -------------------------------------------------------

    pub fn add_transaction(
        &mut self,
        table: &dyn TransactionTable,
        draft: &TransactionDraft,
    ) -> Result<Transaction, StoreError> {
        let new = draft
            .validate(Local::now().date_naive())
            .map_err(|e| self.fail(e.into()))?;
        let row = table
            .insert(&new)
            .map_err(|e| self.fail(StoreError::Write(e)))?;
        tracing::info!(id = %row.id, date = %row.date, "transaction added");

        if self.cache_month == Some(YearMonth::of(row.date)) {
            self.place(row.clone());
        }
        self.refresh_after_write(table);
        Ok(row)
    }

    pub fn update_transaction(
        &mut self,
        table: &dyn TransactionTable,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, StoreError> {
        patch.validate().map_err(|e| self.fail(e.into()))?;
        let row = table
            .update(id, patch)
            .map_err(|e| self.fail(StoreError::Write(e)))?
            .ok_or_else(|| self.fail(StoreError::NotFound(id)))?;
        tracing::info!(%id, "transaction updated");

        if let Some(pos) = self.entries.iter().position(|t| t.id == id) {
            let in_month = self.cache_month == Some(YearMonth::of(row.date));
            if in_month && self.entries[pos].date == row.date {
                self.entries[pos] = row.clone();
            } else {
                self.entries.remove(pos);
                if in_month {
                    self.place(row.clone());
                }
            }
        } else if self.cache_month == Some(YearMonth::of(row.date)) {
            self.place(row.clone());
        }
        self.refresh_after_write(table);
        Ok(row)
    }

    pub fn delete_transaction(
        &mut self,
        table: &dyn TransactionTable,
        id: TransactionId,
    ) -> Result<(), StoreError> {
        let deleted = table
            .delete(id)
            .map_err(|e| self.fail(StoreError::Write(e)))?;
        if !deleted {
            return Err(self.fail(StoreError::NotFound(id)));
        }
        tracing::info!(%id, "transaction deleted");
        self.entries.retain(|t| t.id != id);
        self.refresh_after_write(table);
        Ok(())
    }

    // ---- availability -------------------------------------------------

    pub fn refresh_availability(&mut self, table: &dyn TransactionTable) -> Result<(), StoreError> {
        self.availability = AvailabilityIndex::load(table).map_err(StoreError::Fetch)?;
        Ok(())
    }

    pub fn has_transactions_in_month(&self, year: i32, month: u32) -> bool {
        self.availability.has_month(year, month)
    }

    pub fn has_transactions_in_year(&self, year: i32) -> bool {
        self.availability.has_year(year)
    }

    pub fn previous_year_with_transactions(&self, year: i32) -> Option<i32> {
        self.availability.previous_year(year)
    }

    pub fn next_year_with_transactions(&self, year: i32) -> Option<i32> {
        self.availability.next_year(year)
    }

    pub fn has_previous_month_with_transactions(&self) -> bool {
        self.availability.has_earlier_than(self.cursor.selected())
    }

    // ---- internals ----------------------------------------------------

    fn fail(&mut self, err: StoreError) -> StoreError {
        tracing::error!("{err}");
        self.last_error = Some(err.to_string());
        err
    }

    /// Inserts a row at its sorted position among the loaded rows. A row that
    /// sorts past the loaded prefix while more pages exist is left for a
    /// later page so the next offset stays aligned with the table.
    fn place(&mut self, row: Transaction) {
        if self.entries.iter().any(|t| t.id == row.id) {
            return;
        }
        let pos = self
            .entries
            .iter()
            .position(|t| newest_first(&row, t) != Ordering::Greater)
            .unwrap_or(self.entries.len());
        if pos == self.entries.len() && self.has_more {
            return;
        }
        self.entries.insert(pos, row);
    }

    fn refresh_after_write(&mut self, table: &dyn TransactionTable) {
        if let Err(e) = self.fetch_totals(table) {
            tracing::warn!("totals not refreshed after write: {e}");
        }
        self.refresh_availability_quietly(table);
    }

    fn refresh_availability_quietly(&mut self, table: &dyn TransactionTable) {
        if let Err(e) = self.refresh_availability(table) {
            tracing::warn!("availability index not refreshed: {e}");
        }
    }
}

/// Table order: date, then creation time, then id; all descending.
fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}
