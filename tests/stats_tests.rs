// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{expense, income, ym, FlakyTable};
use fintrack::error::StoreError;
use fintrack::ledger::MonthLedger;
use fintrack::month::{Locale, MonthCursor};
use fintrack::stats::{compute_snapshot, StatsBoard, FALLBACK_COLOR};
use rust_decimal::Decimal;

fn july_table() -> FlakyTable {
    let table = FlakyTable::new();
    table.seed(&[
        income("2024-07-01", "Salary", "3000"),
        expense("2024-07-02", "Food", "120.50"),
        expense("2024-07-09", "Food", "79.50"),
        expense("2024-07-10", "Transport", "100"),
        expense("2024-07-11", "Pets", "25"),
        expense("2024-06-30", "Food", "40"),
        income("2024-09-15", "Freelance", "500"),
        expense("2024-10-01", "Food", "999"),
    ]);
    table
}

#[test]
fn snapshot_totals_and_breakdown() {
    let table = july_table();
    let s = compute_snapshot(&table, ym(2024, 7), Locale::En).unwrap();

    assert_eq!(s.income, Decimal::new(3000, 0));
    assert_eq!(s.expenses, Decimal::new(325, 0));
    assert_eq!(s.balance, s.income - s.expenses);

    let names: Vec<_> = s.category_breakdown.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, ["Food", "Transport", "Pets"]);
    assert_eq!(s.category_breakdown[0].amount, Decimal::new(200, 0));
    assert_eq!(s.category_breakdown[0].percentage, 62);
    assert_eq!(s.category_breakdown[1].percentage, 31);
    assert_eq!(s.category_breakdown[2].percentage, 8);
    assert_eq!(s.category_breakdown[2].color, FALLBACK_COLOR);

    let sum: i64 = s
        .category_breakdown
        .iter()
        .map(|c| i64::from(c.percentage))
        .sum();
    assert!((sum - 100).abs() <= s.category_breakdown.len() as i64);
}

#[test]
fn trend_spans_three_back_two_ahead() {
    let table = july_table();
    let s = compute_snapshot(&table, ym(2024, 7), Locale::En).unwrap();

    let labels: Vec<_> = s.monthly_trend.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, ["Apr", "May", "Jun", "Jul", "Aug", "Sep"]);
    let selected: Vec<_> = s.monthly_trend.iter().map(|p| p.is_selected).collect();
    assert_eq!(selected, [false, false, false, true, false, false]);

    assert_eq!(s.monthly_trend[2].expenses, Decimal::new(40, 0));
    assert_eq!(s.monthly_trend[3].expenses, s.expenses);
    assert_eq!(s.monthly_trend[5].income, Decimal::new(500, 0));
    assert_eq!(s.monthly_trend[5].month, ym(2024, 9));
}

#[test]
fn trend_crosses_year_boundary() {
    let table = FlakyTable::new();
    let s = compute_snapshot(&table, ym(2025, 1), Locale::Ja).unwrap();
    let months: Vec<_> = s.monthly_trend.iter().map(|p| p.month).collect();
    assert_eq!(
        months,
        [
            ym(2024, 10),
            ym(2024, 11),
            ym(2024, 12),
            ym(2025, 1),
            ym(2025, 2),
            ym(2025, 3)
        ]
    );
    assert_eq!(s.monthly_trend[0].label, "10月");
    assert!(s.category_breakdown.is_empty());
    assert_eq!(s.balance, Decimal::ZERO);
}

#[test]
fn failed_refresh_keeps_last_snapshot() {
    let table = july_table();
    let cursor = MonthCursor::starting_at(ym(2024, 7), Locale::En);
    let mut board = StatsBoard::new(cursor.clone());
    board.refresh(&table).unwrap();

    table.fail_reads.set(true);
    cursor.go_to_next_month();
    let err = board.refresh(&table).unwrap_err();
    assert!(matches!(err, StoreError::Fetch(_)));
    assert!(!board.is_loading());
    assert!(board.last_error().is_some());
    assert_eq!(board.snapshot().unwrap().month, ym(2024, 7));
}

#[test]
fn board_follows_shared_cursor_without_touching_ledger() {
    let table = july_table();
    let cursor = MonthCursor::starting_at(ym(2024, 7), Locale::En);
    let mut ledger = MonthLedger::with_page_size(cursor.clone(), 2);
    let mut board = StatsBoard::new(cursor.clone());

    ledger.fetch_first_page(&table).unwrap();
    let cached: Vec<_> = ledger.transactions().iter().map(|t| t.id).collect();

    assert!(board.sync(&table).unwrap());
    assert!(!board.sync(&table).unwrap());

    cursor.go_to_next_month();
    assert!(board.sync(&table).unwrap());
    assert_eq!(board.snapshot().unwrap().month, ym(2024, 8));
    assert_eq!(board.snapshot().unwrap().expenses, Decimal::ZERO);

    let still: Vec<_> = ledger.transactions().iter().map(|t| t.id).collect();
    assert_eq!(cached, still);
    assert_eq!(ledger.cached_month(), Some(ym(2024, 7)));
}

#[test]
fn board_availability() {
    let table = july_table();
    let cursor = MonthCursor::starting_at(ym(2024, 6), Locale::En);
    let mut board = StatsBoard::new(cursor.clone());
    board.refresh(&table).unwrap();

    assert_eq!(board.available_years(), [2024]);
    assert!(board.has_transactions_in_month(2024, 6));
    assert!(!board.has_transactions_in_month(2024, 7));
    assert_eq!(board.previous_year_with_transactions(2024), None);
    assert_eq!(board.next_year_with_transactions(2023), Some(2024));
    assert!(board.is_earliest_month());

    cursor.go_to_next_month();
    assert!(!board.is_earliest_month());
}

#[test]
fn overflowing_month_fails_refresh_without_panicking() {
    let table = FlakyTable::new();
    table.seed(&[
        income("2024-05-01", "Salary", "50000000000000000000000000000"),
        income("2024-05-02", "Salary", "50000000000000000000000000000"),
    ]);
    let cursor = MonthCursor::starting_at(ym(2024, 5), Locale::En);
    let mut board = StatsBoard::new(cursor);
    let err = board.refresh(&table).unwrap_err();
    assert!(matches!(err, StoreError::Fetch(_)));
    assert!(board.snapshot().is_none());
    assert!(!board.is_loading());
}
