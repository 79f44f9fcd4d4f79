//! Airtable record and page envelopes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabline_core::FetchError;

/// One table row.
///
/// `fields` is opaque; envelope keys other than `id` and `fields`
/// (`createdTime`, `commentCount`, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
            extra: Map::new(),
        }
    }
}

/// One response of the list-records endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Continuation token; absent on the last page
    #[serde(default)]
    pub offset: Option<String>,
}

impl Page {
    /// Decode a response body
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Split into records and the token for the next request.
    ///
    /// An empty token counts as absent.
    pub fn into_parts(self) -> (Vec<Record>, Option<String>) {
        let next = self.offset.filter(|t| !t.is_empty());
        (self.records, next)
    }
}
