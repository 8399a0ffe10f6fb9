// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("upload failed: {}: {source}", path.display())]
pub struct ReceiptError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Stores a receipt image and hands back a URL for `receipt_url`.
pub trait ReceiptStore {
    fn upload(&self, image: &[u8]) -> Result<String, ReceiptError>;
}

/// Keeps receipts as files in one directory.
pub struct LocalReceiptStore {
    dir: PathBuf,
}

impl LocalReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReceiptStore for LocalReceiptStore {
    fn upload(&self, image: &[u8]) -> Result<String, ReceiptError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ReceiptError { path, source }
        };
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let mut millis = Utc::now().timestamp_millis();
        let mut path = self.dir.join(format!("receipt_{}.jpg", millis));
        // Two uploads in the same millisecond must not overwrite each other.
        while path.exists() {
            millis += 1;
            path = self.dir.join(format!("receipt_{}.jpg", millis));
        }
        fs::write(&path, image).map_err(io_err(&path))?;

        let abs = fs::canonicalize(&path).map_err(io_err(&path))?;
        tracing::info!(path = %abs.display(), "receipt stored");
        Ok(format!("file://{}", abs.display()))
    }
}
