// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::export::{export_to_dir, ExportRange};
use crate::month::YearMonth;
use crate::store::TransactionTable;
use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use std::path::{Path, PathBuf};

pub fn handle(table: &dyn TransactionTable, sub: &clap::ArgMatches) -> Result<()> {
    let range = range_from_args(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    match run(table, range, Path::new(out.trim()))? {
        Some((path, rows)) => println!("Exported {} transactions to {}", rows, path.display()),
        None => println!("There are no transactions for the selected period."),
    }
    Ok(())
}

pub fn range_from_args(sub: &clap::ArgMatches) -> Result<ExportRange> {
    let kind = sub.get_one::<String>("range").unwrap();
    match kind.as_str() {
        "month" => {
            let month = match sub.get_one::<String>("month") {
                Some(raw) => raw.parse::<YearMonth>().map_err(|e| anyhow!(e))?,
                None => YearMonth::current(),
            };
            Ok(ExportRange::Month(month))
        }
        "year" => {
            let year = match sub.get_one::<i32>("year") {
                Some(y) => *y,
                None => chrono::Local::now().year(),
            };
            Ok(ExportRange::Year(year))
        }
        "all" => Ok(ExportRange::Lifetime),
        other => Err(anyhow!("Unknown range: {} (use month|year|all)", other)),
    }
}

pub fn run(
    table: &dyn TransactionTable,
    range: ExportRange,
    dir: &Path,
) -> Result<Option<(PathBuf, usize)>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;
    Ok(export_to_dir(table, range, dir)?)
}
