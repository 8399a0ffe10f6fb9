// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::TableError;
use crate::month::YearMonth;
use crate::store::{DateRange, TableQuery, TransactionTable};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HEADER: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to query transactions: {0}")]
    Table(#[from] TableError),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRange {
    Month(YearMonth),
    Year(i32),
    Lifetime,
}

impl ExportRange {
    pub fn date_range(&self) -> Option<DateRange> {
        match self {
            ExportRange::Month(ym) => Some(ym.date_range()),
            ExportRange::Year(y) => Some(DateRange::year(*y)),
            ExportRange::Lifetime => None,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            ExportRange::Month(ym) => format!("transactions_{}.csv", ym),
            ExportRange::Year(y) => format!("transactions_{}.csv", y),
            ExportRange::Lifetime => "transactions_lifetime.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No rows in range; nothing was written.
    Empty,
    Written { rows: usize },
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Description column: always quoted, embedded quotes doubled.
fn quote_description(description: Option<&str>) -> String {
    quoted(description.unwrap_or(""))
}

/// Free-text columns other than the description are quoted only when they
/// hold a delimiter, a quote or a line break.
fn quote_if_needed(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quoted(field)
    } else {
        field.to_string()
    }
}

/// Writes the rows in `range` as CSV, newest first. Reads the table
/// directly, never a page cache.
pub fn write_csv<W: Write>(
    table: &dyn TransactionTable,
    range: ExportRange,
    out: W,
) -> Result<ExportOutcome, ExportError> {
    let query = match range.date_range() {
        Some(r) => TableQuery::in_range(r),
        None => TableQuery::all(),
    };
    let rows = table.select(&query)?;
    if rows.is_empty() {
        return Ok(ExportOutcome::Empty);
    }

    // Fields go out verbatim; quoting is done per column above.
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    wtr.write_record(HEADER)?;
    for t in &rows {
        wtr.write_record([
            t.date.to_string(),
            t.r#type.to_string(),
            quote_if_needed(&t.category),
            quote_if_needed(&t.amount),
            quote_description(t.description.as_deref()),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    tracing::info!(rows = rows.len(), ?range, "exported transactions");
    Ok(ExportOutcome::Written { rows: rows.len() })
}

/// Exports into `dir` under the range's file name. Returns `None` when the
/// range holds no transactions.
pub fn export_to_dir(
    table: &dyn TransactionTable,
    range: ExportRange,
    dir: &Path,
) -> Result<Option<(PathBuf, usize)>, ExportError> {
    let mut buf = Vec::new();
    match write_csv(table, range, &mut buf)? {
        ExportOutcome::Empty => Ok(None),
        ExportOutcome::Written { rows } => {
            let path = dir.join(range.file_name());
            std::fs::write(&path, buf).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(Some((path, rows)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_description(Some(r#"5" pizza"#)), r#""5"" pizza""#);
        assert_eq!(quote_description(None), r#""""#);
    }

    #[test]
    fn plain_fields_stay_bare() {
        assert_eq!(quote_if_needed("Food"), "Food");
        assert_eq!(quote_if_needed("Food, drinks"), r#""Food, drinks""#);
        assert_eq!(quote_if_needed("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn file_names() {
        let ym = YearMonth { year: 2024, month: 2 };
        assert_eq!(ExportRange::Month(ym).file_name(), "transactions_2024-03.csv");
        assert_eq!(ExportRange::Year(2024).file_name(), "transactions_2024.csv");
        assert_eq!(ExportRange::Lifetime.file_name(), "transactions_lifetime.csv");
    }
}
