//! Wire types for the content store query API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// Query response envelope.
///
/// Success carries `result`; failures carry `error`. A missing `result`
/// decodes as `None`, which the listing treats as an empty list.
#[derive(Debug, Deserialize)]
pub(super) struct QueryResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<QueryErrorBody>,
    /// Server-side query time
    #[serde(default)]
    pub ms: Option<u64>,
}

/// Error body inside the response envelope
#[derive(Debug, Deserialize)]
pub(super) struct QueryErrorBody {
    #[serde(default, alias = "message")]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl QueryErrorBody {
    pub fn into_fetch_error(self) -> FetchError {
        let message = match self.kind {
            Some(kind) if !self.description.is_empty() => format!("{} ({})", self.description, kind),
            Some(kind) => kind,
            None => self.description,
        };
        FetchError::Upstream { message }
    }
}

/// Slug object as stored by the content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "lenient")]
    pub current: Option<String>,
}

/// Author reference projected into a startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bio: Option<String>,
}

/// One startup in the summary projection.
///
/// Only `_id` is required. Everything else is display data: a field that is
/// absent or of an unexpected type decodes as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(rename = "_createdAt", default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "lenient")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
}

/// Decode an optional display field, treating a type mismatch as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a query `result` into startups.
///
/// `null` or a missing result is an empty list. Anything other than a list of
/// objects with a string `_id` is a [`FetchError::MalformedPayload`].
pub fn decode_startups(result: Option<Value>) -> Result<Vec<StartupRecord>, FetchError> {
    match result {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value(entry).map_err(|e| {
                    FetchError::MalformedPayload(format!("entry {}: {}", index, e))
                })
            })
            .collect(),
        Some(other) => Err(FetchError::MalformedPayload(format!(
            "expected a list, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
