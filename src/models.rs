// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::ocr::ParsedReceipt;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Entertainment",
    "Utilities",
    "Health",
    "Shopping",
    "Education",
    "Other",
];

pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Freelance", "Investments", "Gifts", "Other"];

/// Store-assigned identifier. Callers treat it as opaque text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(TransactionId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }

    /// Suggested categories for this type.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Expense => &EXPENSE_CATEGORIES,
            TransactionType::Income => &INCOME_CATEGORIES,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub category: String,
    pub amount: String, // decimal text, parsed only when aggregating
    pub description: Option<String>,
    pub date: NaiveDate,
    pub receipt_url: Option<String>,
    pub created_at: String,
}

impl Transaction {
    /// Parsed amount. Rows that fail to parse count as zero.
    pub fn amount_value(&self) -> Decimal {
        match self.amount.trim().parse::<Decimal>() {
            Ok(d) => d,
            Err(_) => {
                tracing::warn!(id = %self.id, amount = %self.amount, "unparseable amount, counted as 0");
                Decimal::ZERO
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub category: String,
    pub amount: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub receipt_url: Option<String>,
}

/// Partial update. `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub r#type: Option<TransactionType>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub receipt_url: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.r#type.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.receipt_url.is_none()
    }

    /// Checked before the patch is sent anywhere.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(amount) = &self.amount {
            validate_amount(amount)?;
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(ValidationError::MissingCategory);
            }
        }
        Ok(())
    }
}

/// Form state for a transaction that is still being filled in, either by
/// hand or from a scanned receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub r#type: TransactionType,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub receipt_url: Option<String>,
}

impl TransactionDraft {
    pub fn new(r#type: TransactionType) -> Self {
        Self {
            r#type,
            category: None,
            amount: None,
            description: None,
            date: None,
            receipt_url: None,
        }
    }

    /// Expense draft pre-filled from whatever the scanner managed to read.
    /// An unreadable date is dropped rather than rejected.
    pub fn from_receipt(receipt: &ParsedReceipt) -> Self {
        let date = receipt
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        Self {
            r#type: TransactionType::Expense,
            category: receipt.category.clone().filter(|c| !c.trim().is_empty()),
            amount: receipt.amount.clone().filter(|a| !a.trim().is_empty()),
            description: receipt.description.clone().filter(|d| !d.trim().is_empty()),
            date,
            receipt_url: None,
        }
    }

    /// Turns the draft into an insert payload. A missing date means today.
    pub fn validate(&self, today: NaiveDate) -> Result<NewTransaction, ValidationError> {
        let amount = self
            .amount
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(ValidationError::MissingAmount)?;
        validate_amount(amount)?;
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ValidationError::MissingCategory)?;
        Ok(NewTransaction {
            r#type: self.r#type,
            category: category.to_string(),
            amount: amount.to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            date: self.date.unwrap_or(today),
            receipt_url: self.receipt_url.clone(),
        })
    }
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    let value = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn draft_requires_amount_and_category() {
        let mut draft = TransactionDraft::new(TransactionType::Expense);
        assert_eq!(draft.validate(today()), Err(ValidationError::MissingAmount));
        draft.amount = Some("12.50".into());
        assert_eq!(draft.validate(today()), Err(ValidationError::MissingCategory));
        draft.category = Some("Food".into());
        let tx = draft.validate(today()).unwrap();
        assert_eq!(tx.amount, "12.50");
        assert_eq!(tx.date, today());
    }

    #[test]
    fn draft_rejects_zero_and_garbage_amounts() {
        let mut draft = TransactionDraft::new(TransactionType::Income);
        draft.category = Some("Salary".into());
        for bad in ["0", "-3", "abc"] {
            draft.amount = Some(bad.into());
            assert!(matches!(
                draft.validate(today()),
                Err(ValidationError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn receipt_with_bad_date_keeps_other_fields() {
        let receipt = ParsedReceipt {
            amount: Some("8.40".into()),
            category: None,
            description: Some("Bakery".into()),
            date: Some("yesterday".into()),
        };
        let draft = TransactionDraft::from_receipt(&receipt);
        assert_eq!(draft.r#type, TransactionType::Expense);
        assert_eq!(draft.amount.as_deref(), Some("8.40"));
        assert_eq!(draft.date, None);
        assert_eq!(draft.category, None);
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert_eq!(
            TransactionPatch::default().validate(),
            Err(ValidationError::EmptyPatch)
        );
    }

    #[test]
    fn type_parses_case_insensitively() {
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
