//! ProblemDetails error payloads returned by the API.
//!
//! The server answers failures with an RFC 7807 style body. Validation
//! failures (422) add an `errors` map keyed by field name and an
//! `objectErrors` list for failures not tied to a single field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemDetails {
    pub title: Option<String>,
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub instance: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub properties: Vec<Value>,
    #[serde(deserialize_with = "lenient_field_errors")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(deserialize_with = "lenient_strings")]
    pub object_errors: Option<Vec<String>>,
}

impl ProblemDetails {
    /// Parse a response body, `None` when it is not a JSON object.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Detail text when present and non-empty.
    #[must_use]
    pub fn non_empty_detail(&self) -> Option<&str> {
        self.detail.as_deref().filter(|d| !d.is_empty())
    }
}

/// Field- and object-level validation failures lifted from a 422 body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub object_errors: Vec<String>,
}

impl ValidationErrors {
    /// Lift validation errors out of a problem body; absent members become empty.
    #[must_use]
    pub fn lift(problem: Option<&ProblemDetails>) -> Self {
        let Some(problem) = problem else {
            return Self::default();
        };
        Self {
            field_errors: problem.errors.clone().unwrap_or_default(),
            object_errors: problem.object_errors.clone().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.object_errors.is_empty()
    }
}

// Non-array members and non-string entries are dropped rather than failing
// the whole body.
fn lenient_field_errors<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, Vec<String>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(map)) = raw else {
        return Ok(None);
    };
    let fields = map
        .into_iter()
        .filter_map(|(field, messages)| strings_of(messages).map(|list| (field, list)))
        .collect();
    Ok(Some(fields))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(strings_of))
}

fn strings_of(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    })
}

#[cfg(test)]
#[path = "problem_test.rs"]
mod tests;
