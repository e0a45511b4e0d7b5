// ABOUTME: Read filters for record collections: exact field matches plus an inclusive created_at range.
// ABOUTME: All conditions combine with AND; an empty filter matches every record.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::record::{CREATED_AT_FIELD, Document, timestamp};

/// Reserved filter keys that select on `created_at` instead of a field.
pub const DATE_FROM_KEY: &str = "date_from";
pub const DATE_TO_KEY: &str = "date_to";

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter {key} is not a valid date or timestamp: {value}")]
    InvalidDate { key: String, value: String },
}

/// A conjunction of exact-match tests and an optional `created_at` window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, Value)>,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to equal `value` exactly.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Keep records created at or after `from`.
    pub fn date_from(mut self, from: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Keep records created at or before `to`.
    pub fn date_to(mut self, to: DateTime<Utc>) -> Self {
        self.date_to = Some(to);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.date_from.is_none() && self.date_to.is_none()
    }

    /// Build a filter from a JSON object of `field -> value` entries, where
    /// `date_from` and `date_to` hold timestamp strings or epoch milliseconds.
    pub fn from_map(map: &Document) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        for (key, value) in map {
            match key.as_str() {
                DATE_FROM_KEY => filter.date_from = Some(parse_bound(key, value)?),
                DATE_TO_KEY => filter.date_to = Some(parse_bound(key, value)?),
                _ => filter.fields.push((key.clone(), value.clone())),
            }
        }
        Ok(filter)
    }

    /// Evaluate the filter against one stored record.
    pub fn matches(&self, doc: &Document) -> bool {
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(created_at) = doc
                .get(CREATED_AT_FIELD)
                .and_then(Value::as_str)
                .and_then(timestamp::parse)
            else {
                return false;
            };
            if self.date_from.is_some_and(|from| created_at < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| created_at > to) {
                return false;
            }
        }

        self.fields.iter().all(|(name, expected)| {
            doc.get(name)
                .is_some_and(|actual| values_equal(actual, expected))
        })
    }
}

/// A range bound is a timestamp string, a `YYYY-MM-DD` date, or integer
/// epoch milliseconds.
fn parse_bound(key: &str, value: &Value) -> Result<DateTime<Utc>, FilterError> {
    let parsed = match value {
        Value::String(s) => timestamp::parse(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    parsed.ok_or_else(|| FilterError::InvalidDate {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Strict equality, except that numbers compare by value so `25000` and
/// `25000.0` are equal.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        _ => actual == expected,
    }
}
