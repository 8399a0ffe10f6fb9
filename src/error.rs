// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionId;
use thiserror::Error;

/// Failure raised by a [`crate::store::TransactionTable`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
    #[error("table unavailable: {0}")]
    Unavailable(String),
}

/// Caller-side precondition failures. Never reach the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter an amount")]
    MissingAmount,
    #[error("please enter a valid amount (got '{0}')")]
    InvalidAmount(String),
    #[error("please select a category")]
    MissingCategory,
    #[error("unknown transaction type '{0}' (use expense|income)")]
    UnknownType(String),
    #[error("nothing to update")]
    EmptyPatch,
}

/// Errors surfaced by the ledger and statistics components.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch transactions: {0}")]
    Fetch(#[source] TableError),
    #[error("failed to save transaction: {0}")]
    Write(#[source] TableError),
    #[error("transaction {0} not found")]
    NotFound(TransactionId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// True for insert/update/delete failures, `NotFound` included.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Write(_) | StoreError::NotFound(_))
    }
}
