// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::AppConfig;
use crate::ledger::MonthLedger;
use crate::models::{Transaction, TransactionDraft};
use crate::month::MonthCursor;
use crate::ocr::{GeminiScanner, ParsedReceipt, ReceiptScanner};
use crate::receipts::{LocalReceiptStore, ReceiptStore};
use crate::store::TransactionTable;
use crate::utils::pretty_table;
use anyhow::{Context, Result};

pub struct ScanResult {
    pub receipt: ParsedReceipt,
    pub draft: TransactionDraft,
    pub saved: Option<Transaction>,
}

pub fn handle(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("image").unwrap().trim();
    let image = std::fs::read(path).with_context(|| format!("Read image {}", path))?;
    let scanner = GeminiScanner::new(cfg.gemini_api_key.clone(), cfg.gemini_url.clone())?;
    let store = LocalReceiptStore::new(cfg.receipts_dir());
    let uploader: Option<&dyn ReceiptStore> = if sub.get_flag("upload") {
        Some(&store)
    } else {
        None
    };

    let mut ledger = MonthLedger::with_page_size(MonthCursor::new(cfg.locale), cfg.page_size);
    let result = scan_into(
        &scanner,
        uploader,
        table,
        &mut ledger,
        &image,
        sub.get_flag("save"),
    )?;

    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    println!(
        "{}",
        pretty_table(
            &["Amount", "Category", "Description", "Date"],
            vec![vec![
                show(&result.receipt.amount),
                show(&result.receipt.category),
                show(&result.receipt.description),
                show(&result.receipt.date),
            ]],
        )
    );
    match result.saved {
        Some(tx) => println!("Recorded expense {} on {} [id {}]", tx.amount, tx.date, tx.id),
        None => println!("Not saved (pass --save to record it)"),
    }
    Ok(())
}

/// Scans `image`, optionally stores it, and optionally records the
/// resulting expense through `ledger`.
pub fn scan_into(
    scanner: &dyn ReceiptScanner,
    store: Option<&dyn ReceiptStore>,
    table: &dyn TransactionTable,
    ledger: &mut MonthLedger,
    image: &[u8],
    save: bool,
) -> Result<ScanResult> {
    let receipt = scanner.scan(image).context("Failed to parse receipt")?;
    let mut draft = TransactionDraft::from_receipt(&receipt);

    let saved = if save {
        // Check the fields before storing the image.
        draft.validate(chrono::Local::now().date_naive())?;
        if let Some(store) = store {
            draft.receipt_url = Some(store.upload(image)?);
        }
        Some(ledger.add_transaction(table, &draft)?)
    } else {
        None
    };
    Ok(ScanResult {
        receipt,
        draft,
        saved,
    })
}
