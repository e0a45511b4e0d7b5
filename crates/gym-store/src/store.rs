// ABOUTME: RecordStore: create, read, update, and delete over named JSON record collections.
// ABOUTME: Every mutation loads the whole collection, edits it in memory, and writes it back as one value.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use gym_core::record::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD, timestamp};
use gym_core::{Clock, Document, Entity, Filter, Record, SystemClock, new_record_id};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::backend::{BackendError, StorageBackend};

/// Prefix shared by every key the store writes.
pub const KEY_PREFIX: &str = "gym_";

/// Name under the prefix reserved for the signed-in user's session.
pub const SESSION_NAME: &str = "current_user";

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored value under {key} is not a JSON array of records")]
    Corrupt { key: String },

    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),
}

/// Storage key for a collection.
pub fn collection_key(collection: &str) -> String {
    format!("{KEY_PREFIX}{collection}")
}

/// Any name is a collection except the empty string and the session name,
/// which shares the key prefix.
fn validate_collection(collection: &str) -> Result<(), StoreError> {
    if collection.is_empty() || collection == SESSION_NAME {
        Err(StoreError::InvalidCollection(collection.to_string()))
    } else {
        Ok(())
    }
}

fn record_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Json(serde::ser::Error::custom(format!(
            "expected a JSON object of fields, got {other}"
        )))),
    }
}

/// Named record collections persisted through a [`StorageBackend`].
///
/// Each collection is stored under `gym_<name>` as a JSON array in insertion
/// order. Writes rewrite the entire array, so their cost grows with the
/// collection and their atomicity is that of a single backend `set`.
pub struct RecordStore<B, C = SystemClock> {
    backend: B,
    clock: C,
}

impl<B: StorageBackend> RecordStore<B> {
    /// Create a store stamping records with wall-clock time.
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<B: StorageBackend, C: Clock> RecordStore<B, C> {
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -------------------------------------------------------------------------
    // Untyped documents
    // -------------------------------------------------------------------------

    /// Append a new record built from `fields` plus a fresh id and timestamps.
    /// Any `id`, `created_at`, or `updated_at` in `fields` is ignored.
    pub fn create_document(
        &mut self,
        collection: &str,
        fields: Document,
    ) -> Result<Document, StoreError> {
        let docs = self.prepare_create(collection, fields)?;
        self.persist(collection, &docs)?;
        let created = docs.last().cloned().unwrap_or_default();
        tracing::info!("created {} record {}", collection, record_id(&created).unwrap_or(""));
        Ok(created)
    }

    /// All records in `collection` that satisfy `filter`, in insertion order.
    /// A missing, unreadable, or unparsable collection reads as empty.
    pub fn read_documents(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.load_lenient(collection)
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect()
    }

    /// Shallow-merge `fields` over the record with `id`. Returns `Ok(None)`
    /// when no such record exists, in which case nothing is written.
    pub fn update_document(
        &mut self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let Some((docs, index)) = self.prepare_update(collection, id, fields)? else {
            return Ok(None);
        };
        self.persist(collection, &docs)?;
        tracing::info!("updated {} record {}", collection, id);
        Ok(docs.into_iter().nth(index))
    }

    /// Remove the record with `id` if present. Always returns `true`.
    pub fn delete_document(&mut self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut docs = self.load_strict(collection)?;
        let before = docs.len();
        docs.retain(|doc| record_id(doc) != Some(id));
        self.persist(collection, &docs)?;
        if docs.len() < before {
            tracing::info!("deleted {} record {}", collection, id);
        }
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Typed entities
    // -------------------------------------------------------------------------

    pub fn create<T: Entity>(&mut self, entity: T) -> Result<Record<T>, StoreError> {
        let fields = to_document(&entity)?;
        let docs = self.prepare_create(T::COLLECTION, fields)?;
        let created = docs.last().cloned().unwrap_or_default();
        let record = Record::<T>::from_document(created)?;
        self.persist(T::COLLECTION, &docs)?;
        tracing::info!("created {} record {}", T::COLLECTION, record.id);
        Ok(record)
    }

    /// Records of `T` that satisfy `filter`. Stored records that do not fit
    /// the schema are skipped with a warning.
    pub fn read<T: Entity>(&self, filter: &Filter) -> Vec<Record<T>> {
        self.read_documents(T::COLLECTION, filter)
            .into_iter()
            .filter_map(|doc| {
                let id = record_id(&doc).unwrap_or("").to_string();
                match Record::<T>::from_document(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!("skipping {} record {:?}: {}", T::COLLECTION, id, e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn all<T: Entity>(&self) -> Vec<Record<T>> {
        self.read(&Filter::new())
    }

    pub fn get<T: Entity>(&self, id: &str) -> Option<Record<T>> {
        self.read(&Filter::new().field(ID_FIELD, id)).into_iter().next()
    }

    /// Apply `patch` to the record with `id`. Fields left `None` in the patch
    /// keep their stored values. Returns `Ok(None)` when the id is unknown.
    pub fn update<T: Entity>(
        &mut self,
        id: &str,
        patch: &T::Patch,
    ) -> Result<Option<Record<T>>, StoreError> {
        let fields = to_document(patch)?;
        let Some((docs, index)) = self.prepare_update(T::COLLECTION, id, fields)? else {
            return Ok(None);
        };
        let record = Record::<T>::from_document(docs[index].clone())?;
        self.persist(T::COLLECTION, &docs)?;
        tracing::info!("updated {} record {}", T::COLLECTION, id);
        Ok(Some(record))
    }

    pub fn delete<T: Entity>(&mut self, id: &str) -> Result<bool, StoreError> {
        self.delete_document(T::COLLECTION, id)
    }

    // -------------------------------------------------------------------------
    // Whole-store operations
    // -------------------------------------------------------------------------

    pub fn count(&self, collection: &str) -> usize {
        self.load_lenient(collection).len()
    }

    /// Names of every collection present in the backend, sorted.
    pub fn collections(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(KEY_PREFIX).map(str::to_string))
            .filter(|name| validate_collection(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Every collection and its records, keyed by collection name.
    pub fn dump(&self) -> Result<BTreeMap<String, Vec<Document>>, StoreError> {
        Ok(self
            .collections()?
            .into_iter()
            .map(|name| {
                let docs = self.load_lenient(&name);
                (name, docs)
            })
            .collect())
    }

    /// Remove every key under the store's prefix, session included. Returns
    /// the number of keys removed.
    pub fn clear_all(&mut self) -> Result<usize, StoreError> {
        let keys: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(KEY_PREFIX))
            .collect();
        for key in &keys {
            self.backend.remove(key)?;
        }
        tracing::info!("cleared {} keys", keys.len());
        Ok(keys.len())
    }

    // -------------------------------------------------------------------------
    // Single values outside the collection namespace
    // -------------------------------------------------------------------------

    /// Read a JSON value stored under a raw key. Absent or unparsable data
    /// reads as `None`.
    pub(crate) fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring unparsable value under {}: {}", key, e);
                None
            }
        }
    }

    pub(crate) fn write_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)?;
        Ok(())
    }

    pub(crate) fn remove_value(&mut self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Load a collection for writing. Unlike reads, unparsable data is an
    /// error here so a write never silently replaces it.
    fn load_strict(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        let key = collection_key(collection);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(Vec::new());
        };
        if raw.trim() == "null" {
            return Ok(Vec::new());
        }
        serde_json::from_str::<Vec<Document>>(&raw).map_err(|_| StoreError::Corrupt { key })
    }

    fn load_lenient(&self, collection: &str) -> Vec<Document> {
        match self.load_strict(collection) {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!("reading {} as empty: {}", collection, e);
                Vec::new()
            }
        }
    }

    fn persist(&mut self, collection: &str, docs: &[Document]) -> Result<(), StoreError> {
        let json = serde_json::to_string(docs)?;
        self.backend.set(&collection_key(collection), &json)?;
        tracing::debug!("persisted {} ({} records)", collection, docs.len());
        Ok(())
    }

    /// The collection with a new record appended, not yet persisted.
    fn prepare_create(
        &self,
        collection: &str,
        fields: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs = self.load_strict(collection)?;

        let mut id = new_record_id();
        while docs.iter().any(|doc| record_id(doc) == Some(id.as_str())) {
            id = new_record_id();
        }
        let now = Value::String(timestamp::to_iso(&self.clock.now()));

        let mut doc = Document::new();
        doc.insert(ID_FIELD.to_string(), Value::String(id));
        for (name, value) in fields {
            if !is_system_field(&name) {
                doc.insert(name, value);
            }
        }
        doc.insert(CREATED_AT_FIELD.to_string(), now.clone());
        doc.insert(UPDATED_AT_FIELD.to_string(), now);

        docs.push(doc);
        Ok(docs)
    }

    /// The collection with `fields` merged into record `id`, not yet
    /// persisted, plus that record's index.
    fn prepare_update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<Option<(Vec<Document>, usize)>, StoreError> {
        let mut docs = self.load_strict(collection)?;
        let Some(index) = docs.iter().position(|doc| record_id(doc) == Some(id)) else {
            return Ok(None);
        };

        let previous = docs[index]
            .get(UPDATED_AT_FIELD)
            .and_then(Value::as_str)
            .and_then(timestamp::parse);
        let updated_at = self.next_updated_at(previous);

        let doc = &mut docs[index];
        for (name, value) in fields {
            if !is_system_field(&name) {
                doc.insert(name, value);
            }
        }
        doc.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(timestamp::to_iso(&updated_at)),
        );

        Ok(Some((docs, index)))
    }

    /// Current time, bumped one millisecond past `previous` if the clock has
    /// not moved beyond it, so `updated_at` strictly increases per record.
    fn next_updated_at(&self, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = self.clock.now();
        match previous {
            Some(prev) if now <= prev => prev + TimeDelta::milliseconds(1),
            _ => now,
        }
    }
}

fn is_system_field(name: &str) -> bool {
    matches!(name, ID_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD)
}
