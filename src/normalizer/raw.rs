//! Lenient shapes of the source JSON.
//!
//! Fields of the wrong type are treated as absent so one odd value never
//! costs the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(alias = "link", deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(
        alias = "thumbnail",
        alias = "thumbnailUrl",
        alias = "image",
        deserialize_with = "lenient_string"
    )]
    pub thumb: Option<String>,
    pub embed: Option<RawEmbed>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(alias = "body", alias = "quote", deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(alias = "categories", deserialize_with = "lenient_strings")]
    pub keywords: Vec<String>,
}

impl RawRecord {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        match RawRecord::deserialize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed feed record: {}", e);
                None
            }
        }
    }
}

/// The `embed` field: a structured descriptor, or legacy markup/url text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawEmbed {
    Descriptor {
        platform: String,
        #[serde(alias = "externalId", alias = "external_id")]
        id: String,
    },
    Markup(String),
    Other(Value),
}

/// Top-level `items` array, falling back to nothing when it is not an array.
pub fn items(payload: &Value) -> &[Value] {
    payload
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Keywords of the legacy `{"youtube": {"keywords": [...]}}` shape.
pub fn legacy_keywords(payload: &Value) -> Vec<String> {
    payload
        .pointer("/youtube/keywords")
        .map(strings_from)
        .unwrap_or_default()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(strings_from).unwrap_or_default())
}

fn strings_from(value: &Value) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Value::Array(values) => values.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => vec![s.as_str()],
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
