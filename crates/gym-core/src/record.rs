// ABOUTME: Defines the Record envelope that wraps every stored entity with id and timestamps.
// ABOUTME: Also holds the ISO-8601 timestamp codec and the record identifier generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// An untyped stored record: one JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A stored entity together with its system-assigned fields. The entity's own
/// fields are flattened into the same JSON object, so a `Record<Plan>` encodes
/// as `{"id": .., "name": .., "price": .., "created_at": .., "updated_at": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    /// Decode a record from its stored JSON object. Records written without
    /// `updated_at` take their `created_at` as the last update.
    pub fn from_document(mut doc: Document) -> Result<Self, serde_json::Error> {
        if !doc.contains_key(UPDATED_AT_FIELD)
            && let Some(created_at) = doc.get(CREATED_AT_FIELD).cloned()
        {
            doc.insert(UPDATED_AT_FIELD.to_string(), created_at);
        }
        serde_json::from_value(serde_json::Value::Object(doc))
    }
}

/// Generate a fresh record identifier. ULIDs combine a millisecond timestamp
/// with 80 random bits, so ids are unique and roughly creation-ordered.
pub fn new_record_id() -> String {
    Ulid::new().to_string()
}

/// Serde codec for record timestamps. Writes `YYYY-MM-DDTHH:MM:SS.mmmZ` and
/// reads any RFC 3339 timestamp or a bare `YYYY-MM-DD` date (UTC midnight).
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn to_iso(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_iso(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        pinned: bool,
    }

    #[test]
    fn record_flattens_entity_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = Record {
            id: "abc".to_string(),
            created_at: ts,
            updated_at: ts,
            data: Note {
                title: "Hello".to_string(),
                pinned: true,
            },
        };

        let doc = serde_json::to_value(&record).unwrap();
        assert_eq!(doc["id"], json!("abc"));
        assert_eq!(doc["title"], json!("Hello"));
        assert_eq!(doc["pinned"], json!(true));
        assert_eq!(doc["created_at"], json!("2024-03-01T12:00:00.000Z"));
        assert!(doc.get("data").is_none());
    }

    #[test]
    fn missing_updated_at_falls_back_to_created_at() {
        let serde_json::Value::Object(doc) = json!({
            "id": "admin_force",
            "title": "Seeded",
            "pinned": false,
            "created_at": "2024-05-02T08:30:00.000Z"
        }) else {
            unreachable!()
        };

        let record: Record<Note> = Record::from_document(doc).unwrap();
        assert_eq!(record.updated_at, record.created_at);
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn record_reads_documents_written_by_browser_clients() {
        let doc = json!({
            "id": "id_1700000000000_k3j2h1g0f",
            "title": "From the browser",
            "pinned": false,
            "created_at": "2023-11-14T22:13:20.000Z",
            "updated_at": "2023-11-14T22:13:20.000Z",
            "legacy_field": 7
        });
        let serde_json::Value::Object(doc) = doc else {
            unreachable!()
        };

        let record: Record<Note> = Record::from_document(doc).unwrap();
        assert_eq!(record.id, "id_1700000000000_k3j2h1g0f");
        assert_eq!(record.data.title, "From the browser");
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );
    }

    #[test]
    fn timestamp_parse_accepts_dates_and_offsets() {
        assert_eq!(
            timestamp::parse("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(
            timestamp::parse("2024-01-15T10:00:00-05:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap())
        );
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn new_record_ids_are_distinct() {
        let a = new_record_id();
        let b = new_record_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
    }
}
