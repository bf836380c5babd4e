//! Field snapshots
//!
//! A snapshot is a point-in-time copy of every field value, plus the
//! reserved `_savedAt` key stamped when the snapshot is committed. It
//! serializes to a flat JSON object of strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::SAVED_AT_KEY;

/// Field name → value, plus the capture timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// ISO-8601 capture time, kept verbatim as stored
    #[serde(rename = "_savedAt", default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value. The reserved timestamp key goes to `saved_at`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name == SAVED_AT_KEY {
            self.saved_at = Some(value.into());
        } else {
            self.fields.insert(name, value.into());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        if name == SAVED_AT_KEY {
            return self.saved_at.as_deref();
        }
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field entries, timestamp excluded
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of field entries (timestamp excluded)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.saved_at.is_none()
    }

    pub fn saved_at(&self) -> Option<&str> {
        self.saved_at.as_deref()
    }

    pub fn set_saved_at(&mut self, timestamp: impl Into<String>) {
        self.saved_at = Some(timestamp.into());
    }

    /// Parsed capture time, if present and well-formed
    pub fn saved_at_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.saved_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Compare field entries only, ignoring the timestamp
    pub fn same_fields(&self, other: &FieldSnapshot) -> bool {
        self.fields == other.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}
