// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::cursor_for;
use crate::config::AppConfig;
use crate::stats::{StatsBoard, StatsSnapshot};
use crate::store::TransactionTable;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let (snapshot, earliest) = compute(table, cfg, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snapshot)? {
        return Ok(());
    }
    print_snapshot(&snapshot, cfg);
    if earliest {
        println!("(earliest month with data)");
    }
    Ok(())
}

/// Snapshot for `--month`, plus whether that month is the earliest with data.
pub fn compute(
    table: &dyn TransactionTable,
    cfg: &AppConfig,
    sub: &clap::ArgMatches,
) -> Result<(StatsSnapshot, bool)> {
    let mut board = StatsBoard::new(cursor_for(cfg, sub)?);
    let snapshot = board.refresh(table)?.clone();
    Ok((snapshot, board.is_earliest_month()))
}

fn print_snapshot(s: &StatsSnapshot, cfg: &AppConfig) {
    println!("{}", s.month.label(cfg.locale));
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Balance"],
            vec![vec![
                fmt_money(&s.income),
                fmt_money(&s.expenses),
                fmt_money(&s.balance),
            ]],
        )
    );

    if s.category_breakdown.is_empty() {
        println!("No expenses this month.");
    } else {
        let rows = s
            .category_breakdown
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    fmt_money(&c.amount),
                    format!("{}%", c.percentage),
                    c.color.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "Share", "Color"], rows)
        );
    }

    let rows = s
        .monthly_trend
        .iter()
        .map(|p| {
            let marker = if p.is_selected { "*" } else { "" };
            vec![
                format!("{}{}", p.label, marker),
                fmt_money(&p.income),
                fmt_money(&p.expenses),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expenses"], rows));
}
