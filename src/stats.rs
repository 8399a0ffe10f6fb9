// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::availability::AvailabilityIndex;
use crate::error::{StoreError, TableError};
use crate::ledger::{checked_sum, MonthTotals};
use crate::models::{Transaction, TransactionType};
use crate::month::{Locale, MonthCursor, YearMonth};
use crate::store::{TableQuery, TransactionTable};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;

pub const FALLBACK_COLOR: &str = "#6b7280";

const CATEGORY_COLORS: [(&str, &str); 12] = [
    ("Food", "#f59e0b"),
    ("Transport", "#06b6d4"),
    ("Shopping", "#ec4899"),
    ("Entertainment", "#8b5cf6"),
    ("Utilities", "#10b981"),
    ("Health", "#ef4444"),
    ("Education", "#3b82f6"),
    ("Other", "#6b7280"),
    ("Salary", "#059669"),
    ("Freelance", "#10b981"),
    ("Investments", "#14b8a6"),
    ("Gifts", "#f59e0b"),
];

// Trend window relative to the selected month.
const TREND_BEFORE: i64 = 3;
const TREND_AFTER: i64 = 2;

pub fn category_color(category: &str) -> &'static str {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    pub percentage: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: YearMonth,
    pub label: String,
    pub expenses: Decimal,
    pub income: Decimal,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub month: YearMonth,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub category_breakdown: Vec<CategoryShare>,
    pub monthly_trend: Vec<TrendPoint>,
}

pub fn summarize(rows: &[Transaction]) -> Result<MonthTotals, TableError> {
    MonthTotals::from_rows(rows)
}

/// Expense rows grouped by category, largest first. Percentages are of
/// total expenses, rounded half away from zero; all zero when there are no
/// expenses.
pub fn category_breakdown(rows: &[Transaction]) -> Result<Vec<CategoryShare>, TableError> {
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    let mut total = Decimal::ZERO;
    for t in rows.iter().filter(|t| t.r#type == TransactionType::Expense) {
        let slot = by_category.entry(t.category.as_str()).or_insert(Decimal::ZERO);
        *slot = checked_sum(*slot, t)?;
        total = checked_sum(total, t)?;
    }

    let mut items: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_string(),
            amount,
            percentage: percentage_of(amount, total),
            color: category_color(category),
        })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    Ok(items)
}

fn percentage_of(part: Decimal, total: Decimal) -> u32 {
    if total.is_zero() {
        return 0;
    }
    (part / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Six points from three months before to two months after `selected`,
/// one query per month.
pub fn monthly_trend(
    table: &dyn TransactionTable,
    selected: YearMonth,
    locale: Locale,
) -> Result<Vec<TrendPoint>, TableError> {
    let mut points = Vec::with_capacity((TREND_BEFORE + TREND_AFTER + 1) as usize);
    for delta in -TREND_BEFORE..=TREND_AFTER {
        let month = selected.offset(delta);
        let rows = table.select(&TableQuery::in_range(month.date_range()))?;
        let totals = MonthTotals::from_rows(&rows)?;
        points.push(TrendPoint {
            month,
            label: month.short_label(locale),
            expenses: totals.expenses,
            income: totals.income,
            is_selected: delta == 0,
        });
    }
    Ok(points)
}

/// Builds the whole snapshot or nothing.
pub fn compute_snapshot(
    table: &dyn TransactionTable,
    month: YearMonth,
    locale: Locale,
) -> Result<StatsSnapshot, TableError> {
    let rows = table.select(&TableQuery::in_range(month.date_range()))?;
    let totals = summarize(&rows)?;
    let category_breakdown = category_breakdown(&rows)?;
    let monthly_trend = monthly_trend(table, month, locale)?;
    Ok(StatsSnapshot {
        month,
        income: totals.income,
        expenses: totals.expenses,
        balance: totals.balance,
        category_breakdown,
        monthly_trend,
    })
}

/// Statistics for the selected month. Never touches the ledger's cache.
#[derive(Debug)]
pub struct StatsBoard {
    cursor: MonthCursor,
    snapshot: Option<StatsSnapshot>,
    availability: AvailabilityIndex,
    loading: bool,
    synced_revision: Option<u64>,
    last_error: Option<String>,
}

impl StatsBoard {
    pub fn new(cursor: MonthCursor) -> Self {
        Self {
            cursor,
            snapshot: None,
            availability: AvailabilityIndex::default(),
            loading: false,
            synced_revision: None,
            last_error: None,
        }
    }

    pub fn cursor(&self) -> &MonthCursor {
        &self.cursor
    }

    /// Last committed snapshot. May be for an earlier month if a refresh failed.
    pub fn snapshot(&self) -> Option<&StatsSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    pub fn refresh(&mut self, table: &dyn TransactionTable) -> Result<&StatsSnapshot, StoreError> {
        let month = self.cursor.selected();
        self.loading = true;
        self.last_error = None;
        self.synced_revision = Some(self.cursor.revision());
        tracing::debug!(%month, "computing statistics");
        let result = compute_snapshot(table, month, self.cursor.locale());
        self.loading = false;

        match result {
            Ok(snapshot) => {
                if let Err(e) = self.refresh_availability(table) {
                    tracing::warn!("availability index not refreshed: {e}");
                }
                Ok(&*self.snapshot.insert(snapshot))
            }
            Err(e) => {
                let err = StoreError::Fetch(e);
                tracing::error!("{err}");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Refreshes when the selected month changed since the last refresh.
    pub fn sync(&mut self, table: &dyn TransactionTable) -> Result<bool, StoreError> {
        if self.synced_revision == Some(self.cursor.revision()) {
            return Ok(false);
        }
        self.refresh(table)?;
        Ok(true)
    }

    pub fn refresh_availability(&mut self, table: &dyn TransactionTable) -> Result<(), StoreError> {
        self.availability = AvailabilityIndex::load(table).map_err(StoreError::Fetch)?;
        Ok(())
    }

    pub fn has_transactions_in_month(&self, year: i32, month: u32) -> bool {
        self.availability.has_month(year, month)
    }

    pub fn previous_year_with_transactions(&self, year: i32) -> Option<i32> {
        self.availability.previous_year(year)
    }

    pub fn next_year_with_transactions(&self, year: i32) -> Option<i32> {
        self.availability.next_year(year)
    }

    pub fn available_years(&self) -> Vec<i32> {
        self.availability.years()
    }

    pub fn is_earliest_month(&self) -> bool {
        self.availability.is_earliest(self.cursor.selected())
    }
}
