// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::AppConfig;
use crate::ledger::{MonthLedger, PageOutcome};
use crate::models::{TransactionDraft, TransactionId, TransactionPatch, TransactionType};
use crate::month::{MonthCursor, YearMonth};
use crate::receipts::{LocalReceiptStore, ReceiptStore};
use crate::store::TransactionTable;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{anyhow, bail, Context, Result};

pub fn handle(table: &dyn TransactionTable, cfg: &AppConfig, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(table, cfg, sub)?,
        Some(("add", sub)) => add(table, cfg, sub)?,
        Some(("edit", sub)) => edit(table, cfg, sub)?,
        Some(("rm", sub)) => remove(table, cfg, sub)?,
        Some(("count", _)) => {
            println!("{} transactions", table.count(None)?);
        }
        Some(("clear", sub)) => clear(table, sub)?,
        _ => {}
    }
    Ok(())
}

/// Cursor at `--month` if given, else at the current month.
pub fn cursor_for(cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<MonthCursor> {
    let month = match sub.get_one::<String>("month") {
        Some(raw) => raw.parse::<YearMonth>().map_err(|e| anyhow!(e))?,
        None => YearMonth::current(),
    };
    Ok(MonthCursor::starting_at(month, cfg.locale))
}

/// Loads the first `--pages` pages of the requested month.
pub fn load_month(
    table: &dyn TransactionTable,
    cfg: &AppConfig,
    sub: &clap::ArgMatches,
) -> Result<MonthLedger> {
    let pages = *sub.get_one::<usize>("pages").unwrap_or(&1);
    let mut ledger = MonthLedger::with_page_size(cursor_for(cfg, sub)?, cfg.page_size);
    ledger.fetch_first_page(table)?;
    for _ in 1..pages {
        if ledger.load_more(table)? == PageOutcome::Skipped {
            break;
        }
    }
    Ok(ledger)
}

fn list(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = load_month(table, cfg, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ledger.transactions())? {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ledger
        .transactions()
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.r#type.to_string(),
                t.category.clone(),
                t.amount.clone(),
                t.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", ledger.cursor().month_label());
    println!(
        "{}",
        pretty_table(&["ID", "Date", "Type", "Category", "Amount", "Description"], rows)
    );
    let totals = ledger.totals();
    println!(
        "Income {}  Expenses {}  Balance {}",
        fmt_money(&totals.income),
        fmt_money(&totals.expenses),
        fmt_money(&totals.balance)
    );
    if ledger.has_more() {
        println!("More transactions available (use --pages)");
    }
    Ok(())
}

fn add(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let r#type = sub.get_one::<String>("type").unwrap().parse::<TransactionType>()?;
    let mut draft = TransactionDraft::new(r#type);
    draft.amount = sub.get_one::<String>("amount").cloned();
    draft.category = sub.get_one::<String>("category").cloned();
    draft.description = sub.get_one::<String>("description").cloned();
    draft.date = sub
        .get_one::<String>("date")
        .map(|d| parse_date(d))
        .transpose()?;

    // Validate before uploading anything.
    draft.validate(chrono::Local::now().date_naive())?;

    if let Some(path) = sub.get_one::<String>("receipt") {
        let bytes = std::fs::read(path).with_context(|| format!("Read receipt {}", path))?;
        let store = LocalReceiptStore::new(cfg.receipts_dir());
        draft.receipt_url = Some(store.upload(&bytes)?);
    }

    let mut ledger = MonthLedger::with_page_size(MonthCursor::new(cfg.locale), cfg.page_size);
    let tx = ledger.add_transaction(table, &draft)?;
    println!(
        "Recorded {} {} ({}) on {} [id {}]",
        tx.r#type, tx.amount, tx.category, tx.date, tx.id
    );
    Ok(())
}

pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    Ok(TransactionPatch {
        r#type: sub
            .get_one::<String>("type")
            .map(|t| t.parse::<TransactionType>())
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
        amount: sub.get_one::<String>("amount").cloned(),
        description: sub
            .get_one::<String>("description")
            .map(|d| Some(d.clone()).filter(|d| !d.is_empty())),
        date: sub
            .get_one::<String>("date")
            .map(|d| parse_date(d))
            .transpose()?,
        receipt_url: None,
    })
}

fn parse_id(sub: &clap::ArgMatches) -> Result<TransactionId> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.parse::<TransactionId>()
        .with_context(|| format!("Invalid transaction id '{}'", raw))
}

fn edit(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let patch = patch_from_args(sub)?;
    let mut ledger = MonthLedger::with_page_size(MonthCursor::new(cfg.locale), cfg.page_size);
    let tx = ledger.update_transaction(table, id, &patch)?;
    println!(
        "Updated [id {}]: {} {} ({}) on {}",
        tx.id, tx.r#type, tx.amount, tx.category, tx.date
    );
    Ok(())
}

fn remove(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let mut ledger = MonthLedger::with_page_size(MonthCursor::new(cfg.locale), cfg.page_size);
    ledger.delete_transaction(table, id)?;
    println!("Deleted transaction {}", id);
    Ok(())
}

fn clear(table: &dyn TransactionTable, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        bail!("Refusing to delete every transaction without --yes");
    }
    let n = table.delete_all()?;
    tracing::info!(rows = n, "cleared all transactions");
    println!("Deleted {} transactions", n);
    Ok(())
}
