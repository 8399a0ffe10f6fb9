// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Receipt scanning through the Gemini vision endpoint.

use crate::models::EXPENSE_CATEGORIES;
use base64::Engine as _;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

/// Fields read off a receipt. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

// Models sometimes answer `"amount": 25.99` instead of a string.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("no response from the model")]
    EmptyResponse,
    #[error("could not parse receipt data")]
    NoJson,
    #[error("malformed receipt json: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait ReceiptScanner {
    fn scan(&self, image: &[u8]) -> Result<ParsedReceipt, OcrError>;
}

/// Pulls the first `{...}` block out of the model's text (which may be
/// wrapped in markdown fences) and normalizes the category.
pub fn parse_model_text(text: &str) -> Result<ParsedReceipt, OcrError> {
    let m = JSON_OBJECT.find(text).ok_or(OcrError::NoJson)?;
    let mut parsed: ParsedReceipt = serde_json::from_str(m.as_str())?;
    if let Some(cat) = &parsed.category {
        if !EXPENSE_CATEGORIES.contains(&cat.trim()) {
            parsed.category = Some("Other".to_string());
        }
    }
    Ok(parsed)
}

pub fn build_prompt(today: NaiveDate) -> String {
    format!(
        r#"Analyze this receipt image and extract the following information.
Return ONLY a valid JSON object with these exact fields:
{{
    "amount": "total amount as a number string (e.g., '25.99')",
    "category": "one of: {categories}",
    "description": "brief description of the purchase (store name + main items)",
    "date": "date in YYYY-MM-DD format (use today if not visible)"
}}

Rules:
- For amount, use the TOTAL or final amount paid
- For category, pick the most appropriate from the list
- For description, keep it short (e.g., "Starbucks - Coffee")
- For date, extract from receipt or use today's date: {today}

Return ONLY the JSON object, no other text."#,
        categories = EXPENSE_CATEGORIES.join(", "),
        today = today,
    )
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct GeminiScanner {
    client: reqwest::blocking::Client,
    api_key: String,
    url: String,
}

impl GeminiScanner {
    pub fn new(api_key: Option<String>, url: impl Into<String>) -> Result<Self, OcrError> {
        let api_key = api_key.ok_or(OcrError::MissingApiKey)?;
        Ok(Self {
            client: crate::utils::http_client()?,
            api_key,
            url: url.into(),
        })
    }
}

impl ReceiptScanner for GeminiScanner {
    fn scan(&self, image: &[u8]) -> Result<ParsedReceipt, OcrError> {
        let today = chrono::Local::now().date_naive();
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": build_prompt(today) },
                    { "inline_data": {
                        "mime_type": "image/jpeg",
                        "data": base64::engine::general_purpose::STANDARD.encode(image),
                    }},
                ]
            }]
        });

        tracing::debug!(bytes = image.len(), "sending receipt to vision endpoint");
        let resp = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<ApiErrorBody>()
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Gemini API request failed ({})", status));
            return Err(OcrError::Api(message));
        }

        let result: GenerateResponse = resp.json()?;
        let text = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(OcrError::EmptyResponse)?;
        parse_model_text(&text)
    }
}
