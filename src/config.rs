// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::month::Locale;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fintrack", "fintrack"));

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub page_size: usize,
    pub locale: Locale,
    pub gemini_api_key: Option<String>,
    pub gemini_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = match get("FINTRACK_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from(APP.0, APP.1, APP.2)
                .context("Could not determine platform-specific data dir")?
                .data_dir()
                .to_path_buf(),
        };

        let page_size = match get("FINTRACK_PAGE_SIZE") {
            Some(raw) => {
                let n = raw
                    .parse::<usize>()
                    .with_context(|| format!("Invalid FINTRACK_PAGE_SIZE '{}'", raw))?;
                if n == 0 {
                    return Err(anyhow!("FINTRACK_PAGE_SIZE must be at least 1"));
                }
                n
            }
            None => DEFAULT_PAGE_SIZE,
        };

        let locale = match get("FINTRACK_LOCALE") {
            Some(raw) => raw.parse::<Locale>().map_err(|e| anyhow!(e))?,
            None => Locale::default(),
        };

        Ok(Self {
            data_dir,
            page_size,
            locale,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_url: get("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("fintrack.sqlite")
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.data_dir.join("receipts")
    }
}
