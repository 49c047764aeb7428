//! Student records and the exam-number keyed dataset.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// A single student's published result.
///
/// Every field defaults to an empty string when the source document omits it
/// or sets it to `null`. Numbers and booleans keep their JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub grade: String,
    /// Formatted score, e.g. "450/500"
    #[serde(deserialize_with = "lenient_string")]
    pub total: String,
    #[serde(deserialize_with = "lenient_string")]
    pub evaluation: String,
    /// Pass/fail indicator as localized text
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub department: String,
}

/// Any JSON value as display text; `null` becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl StudentRecord {
    /// Whether the status text carries the fail keyword.
    pub fn is_fail(&self, fail_keyword: &str) -> bool {
        !fail_keyword.is_empty() && self.status.contains(fail_keyword)
    }
}

/// Exam number -> record map, read-only once built.
///
/// Entries keep the order a browser enumerates the source object in:
/// array-index keys ascending first, then every other key in document order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entries: Vec<(String, StudentRecord)>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Parse a JSON document shaped as `{ "<exam number>": { ...record } }`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)?;
        let mut entries = Vec::with_capacity(map.len());
        for (exam_number, value) in map {
            let record: StudentRecord = serde_json::from_value(value)?;
            entries.push((exam_number, record));
        }
        Ok(Self::from_entries(entries))
    }

    /// Build from entries in document order. A repeated key keeps its first
    /// position and its last record.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, StudentRecord)>,
    {
        let mut indices: Vec<(String, StudentRecord)> = Vec::new();
        let mut others: Vec<(String, StudentRecord)> = Vec::new();
        let mut seen: HashMap<String, (bool, usize)> = HashMap::new();

        for (key, record) in entries {
            if let Some(&(is_index, pos)) = seen.get(&key) {
                let bucket = if is_index { &mut indices } else { &mut others };
                bucket[pos].1 = record;
                continue;
            }
            let is_index = is_array_index(&key);
            let bucket = if is_index { &mut indices } else { &mut others };
            seen.insert(key.clone(), (is_index, bucket.len()));
            bucket.push((key, record));
        }

        indices.sort_by_key(|(key, _)| key.parse::<u32>().unwrap_or(u32::MAX));
        indices.extend(others);

        let index = indices
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();

        Dataset {
            entries: indices,
            index,
        }
    }

    /// Exact-key lookup.
    pub fn get(&self, exam_number: &str) -> Option<&StudentRecord> {
        self.index.get(exam_number).map(|&i| &self.entries[i].1)
    }

    /// Entries in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StudentRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical array index: decimal, no leading zeros, below 2^32 - 1.
fn is_array_index(key: &str) -> bool {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if key.len() > 1 && key.starts_with('0') {
        return false;
    }
    matches!(key.parse::<u32>(), Ok(n) if n < u32::MAX)
}
