// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The selected-month cursor shared by the ledger and the statistics board.

use crate::store::DateRange;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

// Keeps every YearMonth inside the range chrono can represent.
const MIN_YEAR: i32 = -200_000;
const MAX_YEAR: i32 = 200_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "ja" | "ja-jp" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale '{}' (use en|ja)", other)),
        }
    }
}

/// A calendar month. `month` is zero-based: 0 is January, 11 is December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Builds a month, carrying an out-of-range month into the year
    /// (month 12 of 2024 is January 2025, month -1 is December 2023).
    pub fn new(year: i32, month: i64) -> Self {
        let total = i64::from(year) * 12 + month;
        let year = total.div_euclid(12).clamp(i64::from(MIN_YEAR), i64::from(MAX_YEAR)) as i32;
        Self {
            year,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn offset(self, months: i64) -> Self {
        Self::new(self.year, i64::from(self.month) + months)
    }

    pub fn previous(self) -> Self {
        self.offset(-1)
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    pub fn first_day(self) -> NaiveDate {
        ymd(self.year, self.month + 1, 1)
    }

    pub fn last_day(self) -> NaiveDate {
        let m = self.month + 1;
        let last = match m {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => {
                if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() {
                    29
                } else {
                    28
                }
            }
        };
        ymd(self.year, m, last)
    }

    /// Inclusive range from the first to the last calendar day.
    pub fn date_range(self) -> DateRange {
        DateRange::new(self.first_day(), self.last_day())
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    /// "July 2024" / "2024年7月".
    pub fn label(self, locale: Locale) -> String {
        match locale {
            Locale::En => self.first_day().format("%B %Y").to_string(),
            Locale::Ja => format!("{}年{}月", self.year, self.month + 1),
        }
    }

    /// "Jul" / "7月".
    pub fn short_label(self, locale: Locale) -> String {
        match locale {
            Locale::En => self.first_day().format("%b").to_string(),
            Locale::Ja => format!("{}月", self.month + 1),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month + 1)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parses `YYYY-MM` (one-based month, as typed by people).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(Self::of(d))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Unreachable for clamped years.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[derive(Debug)]
struct CursorState {
    selected: YearMonth,
    revision: u64,
}

/// Shared handle to the selected month. Clones point at the same cursor;
/// consumers compare [`MonthCursor::revision`] with the revision they last
/// synced to in order to notice a change.
#[derive(Debug, Clone)]
pub struct MonthCursor {
    state: Rc<RefCell<CursorState>>,
    locale: Locale,
}

impl MonthCursor {
    pub fn new(locale: Locale) -> Self {
        Self::starting_at(YearMonth::current(), locale)
    }

    pub fn starting_at(selected: YearMonth, locale: Locale) -> Self {
        Self {
            state: Rc::new(RefCell::new(CursorState {
                selected,
                revision: 0,
            })),
            locale,
        }
    }

    pub fn selected(&self) -> YearMonth {
        self.state.borrow().selected
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Replaces the cursor. Months outside 0..=11 carry into the year.
    pub fn set_month(&self, year: i32, month: i64) {
        self.replace(YearMonth::new(year, month));
    }

    pub fn go_to_previous_month(&self) {
        let prev = self.selected().previous();
        self.replace(prev);
    }

    pub fn go_to_next_month(&self) {
        let next = self.selected().next();
        self.replace(next);
    }

    pub fn is_current_month(&self) -> bool {
        self.is_current_month_at(Local::now().date_naive())
    }

    pub fn is_current_month_at(&self, today: NaiveDate) -> bool {
        self.selected().contains(today)
    }

    pub fn month_label(&self) -> String {
        self.selected().label(self.locale)
    }

    fn replace(&self, selected: YearMonth) {
        let mut state = self.state.borrow_mut();
        state.selected = selected;
        state.revision += 1;
        tracing::debug!(month = %selected, revision = state.revision, "selected month changed");
    }
}

impl Default for MonthCursor {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
