//! Inbound request value
//!
//! A request is a header map plus an arbitrary JSON payload. Header names are
//! stored lowercased so each name holds a single value.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Header carrying the caller's credential
pub const AUTHORIZATION: &str = "Authorization";

/// A decoded request as seen by middleware and handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "lowercase_names")]
    headers: HashMap<String, String>,
    /// Handler arguments; `Null` when the caller sent none
    #[serde(default)]
    pub payload: Value,
}

impl Request {
    /// Creates a request with no headers and a `Null` payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a header. Names differing only in case replace each other.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers, keyed by lowercased name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns a top-level payload field, if the payload is an object.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

// Names are visited in sorted order, so when two collide by case the
// lowercase spelling wins.
fn lowercase_names<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(mut name, value)| {
            name.make_ascii_lowercase();
            (name, value)
        })
        .collect())
}
