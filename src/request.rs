//! Request boundary
//!
//! Normalizes the two accepted payload envelopes (`{ url, productName }` and
//! `{ data: { url, productName } }`) into one shape, validates it, and splits
//! the comma-separated URL list.

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Validated ingestion request.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRequest {
    pub urls: Vec<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    url: String,
    #[serde(default)]
    product_name: Option<String>,
}

impl IngestRequest {
    pub fn new(url_list: &str, product_name: Option<String>) -> Result<Self> {
        Ok(Self {
            urls: parse_url_list(url_list)?,
            product_name,
        })
    }

    /// Parse an untyped request payload.
    pub fn from_value(value: Value) -> Result<Self> {
        let payload: Payload = serde_json::from_value(unwrap_envelope(value)).map_err(|e| {
            Error::InvalidArgument(format!(
                "Request must include a 'url' string of comma-separated image URLs: {}",
                e
            ))
        })?;

        Self::new(&payload.url, payload.product_name)
    }

    pub fn main_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

/// Lift `data` into place when the top-level `url` is missing, null or blank.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !has_usable_url(&map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                map.insert("data".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

fn has_usable_url(map: &Map<String, Value>) -> bool {
    match map.get("url") {
        None | Some(Value::Null) => false,
        Some(Value::String(url)) => !url.trim().is_empty(),
        Some(_) => true,
    }
}

/// Split on commas, trim each segment, and drop empty ones.
pub fn parse_url_list(input: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(Error::InvalidArgument(
            "No valid image URLs provided".to_string(),
        ));
    }

    Ok(urls)
}
