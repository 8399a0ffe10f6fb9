// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::availability::AvailabilityIndex;
use crate::config::AppConfig;
use crate::month::YearMonth;
use crate::store::TransactionTable;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(table: &dyn TransactionTable, cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<()> {
    let idx = AvailabilityIndex::load(table)?;
    if idx.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    if let Some(&year) = sub.get_one::<i32>("year") {
        let rows = idx
            .months_in(year)
            .into_iter()
            .map(|m| vec![YearMonth { year, month: m }.label(cfg.locale)])
            .collect();
        println!("{}", pretty_table(&["Months with data"], rows));
        let show = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "Previous year: {}  Next year: {}",
            show(idx.previous_year(year)),
            show(idx.next_year(year))
        );
    } else {
        let rows = idx
            .years()
            .into_iter()
            .map(|y| vec![y.to_string(), idx.months_in(y).len().to_string()])
            .collect();
        println!("{}", pretty_table(&["Year", "Months"], rows));
    }
    Ok(())
}
