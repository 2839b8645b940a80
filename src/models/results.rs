use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::NormError;
use crate::models::field::FieldValue;

/// Specimen count written for records entered in implicit multi mode.
pub const QTY_KEY: &str = "_qty";
/// Marker for records entered in implicit multi mode.
pub const MULTI_IMPLICIT_KEY: &str = "_is_multi_implicit";

pub fn is_reserved_key(key: &str) -> bool {
    key == QTY_KEY || key == MULTI_IMPLICIT_KEY
}

pub fn specimen_key(field_id: &str, index: usize) -> String {
    format!("{}_{}", field_id, index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexIssue {
    Empty,
    NotDecimal,
    LeadingZero,
    Overflow,
}

impl fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            IndexIssue::Empty => "empty specimen index",
            IndexIssue::NotDecimal => "specimen index is not a non-negative integer",
            IndexIssue::LeadingZero => "specimen index has a leading zero",
            IndexIssue::Overflow => "specimen index does not fit",
        };
        f.write_str(msg)
    }
}

/// Splits `<prefix>_<suffix>` at the last underscore and parses the suffix
/// as a canonical specimen index. Returns `None` when the key has no
/// non-empty prefix.
pub fn parse_specimen_key(key: &str) -> Option<(&str, Result<usize, IndexIssue>)> {
    let (prefix, suffix) = key.rsplit_once('_')?;
    if prefix.is_empty() {
        return None;
    }
    Some((prefix, parse_index(suffix)))
}

fn parse_index(suffix: &str) -> Result<usize, IndexIssue> {
    if suffix.is_empty() {
        return Err(IndexIssue::Empty);
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IndexIssue::NotDecimal);
    }
    if suffix.len() > 1 && suffix.starts_with('0') {
        return Err(IndexIssue::LeadingZero);
    }
    suffix.parse::<usize>().map_err(|_| IndexIssue::Overflow)
}

/// Non-fatal findings produced while reading persisted results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeNote {
    MalformedFlatKey { key: String, reason: String },
    SpecimenBeyondQuantity { key: String, index: usize, quantity: usize },
    NonScalarValue { key: String },
}

impl fmt::Display for DecodeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeNote::MalformedFlatKey { key, reason } => {
                write!(f, "malformed flat key '{}': {}", key, reason)
            }
            DecodeNote::SpecimenBeyondQuantity { key, index, quantity } => write!(
                f,
                "key '{}' addresses specimen {} but the record holds {}",
                key, index, quantity
            ),
            DecodeNote::NonScalarValue { key } => {
                write!(f, "key '{}' holds a non-scalar value", key)
            }
        }
    }
}

/// The persisted shape of one sample's results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatResultMap(BTreeMap<String, FieldValue>);

impl FlatResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_multi_implicit(&self) -> bool {
        self.get(MULTI_IMPLICIT_KEY).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// Reads a JSON object as stored by the persistence layer. Nulls are
    /// dropped; arrays and objects are dropped with a note.
    pub fn from_json_value(value: &Value) -> Result<(Self, Vec<DecodeNote>), NormError> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Ok((Self::new(), Vec::new())),
            other => {
                return Err(NormError::MalformedPayload {
                    reason: format!("expected an object, found {}", json_kind(other)),
                })
            }
        };

        let mut map = Self::new();
        let mut notes = Vec::new();
        for (key, entry) in object {
            match entry {
                Value::Null => {}
                Value::Bool(b) => map.insert(key.clone(), *b),
                Value::Number(n) => match n.as_f64() {
                    Some(n) => map.insert(key.clone(), n),
                    None => notes.push(DecodeNote::NonScalarValue { key: key.clone() }),
                },
                Value::String(s) => map.insert(key.clone(), s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    notes.push(DecodeNote::NonScalarValue { key: key.clone() })
                }
            }
        }
        Ok((map, notes))
    }

    pub fn to_json_value(&self) -> Result<Value, NormError> {
        serde_json::to_value(self)
            .map_err(|e| NormError::MalformedPayload { reason: e.to_string() })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl FromIterator<(String, FieldValue)> for FlatResultMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FlatResultMap {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub type SpecimenRow = BTreeMap<String, FieldValue>;

/// In-memory working set for one sample's test entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResults {
    pub global_values: BTreeMap<String, FieldValue>,
    pub specimen_rows: Vec<SpecimenRow>,
    pub multi_mode: bool,
}

impl StructuredResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh implicit multi-mode state with one empty row to edit.
    pub fn implicit_multi() -> Self {
        Self {
            global_values: BTreeMap::new(),
            specimen_rows: vec![SpecimenRow::new()],
            multi_mode: true,
        }
    }

    pub fn with_global(mut self, field_id: &str, value: impl Into<FieldValue>) -> Self {
        self.global_values.insert(field_id.to_string(), value.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<SpecimenRow>) -> Self {
        self.specimen_rows = rows;
        self
    }

    pub fn with_multi_mode(mut self, multi_mode: bool) -> Self {
        self.multi_mode = multi_mode;
        self
    }

    pub fn specimen_count(&self) -> usize {
        self.specimen_rows.len()
    }

    pub fn global(&self, field_id: &str) -> Option<&FieldValue> {
        self.global_values.get(field_id)
    }

    pub fn specimen_value(&self, index: usize, field_id: &str) -> Option<&FieldValue> {
        self.specimen_rows.get(index).and_then(|row| row.get(field_id))
    }
}

/// Builds a row from `(field id, value)` pairs.
pub fn row<V: Into<FieldValue>>(cells: Vec<(&str, V)>) -> SpecimenRow {
    cells.into_iter().map(|(k, v)| (k.to_string(), v.into())).collect()
}
