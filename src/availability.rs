// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::TableError;
use crate::month::YearMonth;
use crate::store::TransactionTable;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Which (year, month) buckets hold at least one transaction.
/// Months are zero-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    months: BTreeMap<i32, BTreeSet<u32>>,
}

impl AvailabilityIndex {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let mut months: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
        for d in dates {
            months.entry(d.year()).or_default().insert(d.month0());
        }
        Self { months }
    }

    pub fn load(table: &dyn TransactionTable) -> Result<Self, TableError> {
        Ok(Self::from_dates(table.select_dates()?))
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn has_month(&self, year: i32, month: u32) -> bool {
        self.months.get(&year).is_some_and(|m| m.contains(&month))
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.months.contains_key(&year)
    }

    /// Ascending.
    pub fn years(&self) -> Vec<i32> {
        self.months.keys().copied().collect()
    }

    pub fn months_in(&self, year: i32) -> Vec<u32> {
        self.months
            .get(&year)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn previous_year(&self, year: i32) -> Option<i32> {
        self.months.range(..year).next_back().map(|(y, _)| *y)
    }

    pub fn next_year(&self, year: i32) -> Option<i32> {
        self.months
            .range(year.saturating_add(1)..)
            .next()
            .map(|(y, _)| *y)
    }

    pub fn earliest(&self) -> Option<YearMonth> {
        let (year, months) = self.months.iter().next()?;
        let month = *months.iter().next()?;
        Some(YearMonth { year: *year, month })
    }

    /// Any bucket strictly before `ym`.
    pub fn has_earlier_than(&self, ym: YearMonth) -> bool {
        self.earliest().is_some_and(|e| e < ym)
    }

    /// True when there is no data at all, or `ym` is the first month with data.
    pub fn is_earliest(&self, ym: YearMonth) -> bool {
        match self.earliest() {
            None => true,
            Some(e) => e == ym,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> AvailabilityIndex {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        AvailabilityIndex::from_dates([
            d(2021, 11, 3),
            d(2023, 2, 1),
            d(2023, 2, 20),
            d(2023, 7, 9),
            d(2025, 1, 1),
        ])
    }

    #[test]
    fn groups_by_year_and_zero_based_month() {
        let idx = index();
        assert!(idx.has_month(2023, 1));
        assert!(idx.has_month(2023, 6));
        assert!(!idx.has_month(2023, 2));
        assert!(idx.has_year(2021));
        assert!(!idx.has_year(2022));
        assert_eq!(idx.years(), vec![2021, 2023, 2025]);
        assert_eq!(idx.months_in(2023), vec![1, 6]);
    }

    #[test]
    fn neighbouring_years_skip_gaps() {
        let idx = index();
        assert_eq!(idx.previous_year(2023), Some(2021));
        assert_eq!(idx.previous_year(2022), Some(2021));
        assert_eq!(idx.previous_year(2021), None);
        assert_eq!(idx.next_year(2023), Some(2025));
        assert_eq!(idx.next_year(2025), None);
    }

    #[test]
    fn earlier_months() {
        let idx = index();
        assert_eq!(idx.earliest(), Some(YearMonth { year: 2021, month: 10 }));
        assert!(idx.has_earlier_than(YearMonth { year: 2021, month: 11 }));
        assert!(!idx.has_earlier_than(YearMonth { year: 2021, month: 10 }));
        assert!(idx.is_earliest(YearMonth { year: 2021, month: 10 }));
        assert!(AvailabilityIndex::default().is_earliest(YearMonth { year: 1999, month: 0 }));
    }
}
