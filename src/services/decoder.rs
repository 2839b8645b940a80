//! Rebuilds the structured working set from a persisted flat map.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::NormError;
use crate::models::results::{is_reserved_key, parse_specimen_key, QTY_KEY};
use crate::models::{DecodeNote, FieldValue, FlatResultMap, NormSchema, SpecimenRow, StructuredResults};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    pub results: StructuredResults,
    pub notes: Vec<DecodeNote>,
}

struct SpecimenEntry {
    key: String,
    field_id: String,
    index: usize,
    value: FieldValue,
}

pub struct Decoder<'a> {
    schema: &'a NormSchema,
    max_specimens: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(schema: &'a NormSchema) -> Self {
        Self { schema, max_specimens: EngineConfig::default().max_specimens }
    }

    pub fn from_config(schema: &'a NormSchema, config: &EngineConfig) -> Self {
        Self { schema, max_specimens: config.max_specimens }
    }

    pub fn with_max_specimens(mut self, max_specimens: usize) -> Self {
        self.max_specimens = max_specimens;
        self
    }

    pub fn decode(&self, flat: Option<&FlatResultMap>) -> Decoded {
        let flat = match flat {
            Some(flat) if !flat.is_empty() => flat,
            _ => {
                return Decoded { results: StructuredResults::new(), notes: Vec::new() };
            }
        };

        let mut notes = Vec::new();
        let mut global_values = BTreeMap::new();
        let mut entries = Vec::new();

        for (key, value) in flat {
            if is_reserved_key(key) {
                continue;
            }
            // An exact field id is global even if it also parses as a specimen key.
            if self.schema.contains_field(key) {
                global_values.insert(key.clone(), value.clone());
                continue;
            }
            match parse_specimen_key(key) {
                Some((prefix, parsed)) if self.schema.contains_field(prefix) => match parsed {
                    Ok(index) if index < self.max_specimens => entries.push(SpecimenEntry {
                        key: key.clone(),
                        field_id: prefix.to_string(),
                        index,
                        value: value.clone(),
                    }),
                    Ok(index) => notes.push(DecodeNote::MalformedFlatKey {
                        key: key.clone(),
                        reason: format!(
                            "specimen index {} exceeds the limit of {}",
                            index, self.max_specimens
                        ),
                    }),
                    Err(issue) => notes.push(DecodeNote::MalformedFlatKey {
                        key: key.clone(),
                        reason: issue.to_string(),
                    }),
                },
                _ => {
                    global_values.insert(key.clone(), value.clone());
                }
            }
        }

        let multi_mode = flat.is_multi_implicit();
        let count = if multi_mode {
            self.declared_quantity(flat)
        } else {
            entries.iter().map(|e| e.index + 1).max().unwrap_or(0)
        };

        let mut specimen_rows = vec![SpecimenRow::new(); count];
        for entry in entries {
            match specimen_rows.get_mut(entry.index) {
                Some(row) => {
                    row.insert(entry.field_id, entry.value);
                }
                None => notes.push(DecodeNote::SpecimenBeyondQuantity {
                    key: entry.key,
                    index: entry.index,
                    quantity: count,
                }),
            }
        }
        if multi_mode && specimen_rows.is_empty() {
            specimen_rows.push(SpecimenRow::new());
        }

        for note in &notes {
            warn!(norm = %self.schema.code(), note = %note, "ignoring persisted result entry");
        }

        Decoded {
            results: StructuredResults { global_values, specimen_rows, multi_mode },
            notes,
        }
    }

    /// Decodes a JSON payload from the persistence layer.
    pub fn decode_json(&self, value: &Value) -> Result<Decoded, NormError> {
        let (flat, mut payload_notes) = FlatResultMap::from_json_value(value)?;
        for note in &payload_notes {
            warn!(norm = %self.schema.code(), note = %note, "ignoring persisted result entry");
        }
        let mut decoded = self.decode(Some(&flat));
        payload_notes.append(&mut decoded.notes);
        decoded.notes = payload_notes;
        Ok(decoded)
    }

    /// `_qty` as written in implicit multi mode; anything unreadable is 0.
    fn declared_quantity(&self, flat: &FlatResultMap) -> usize {
        let qty = flat.get(QTY_KEY).and_then(FieldValue::as_f64).unwrap_or(0.0);
        if qty <= 0.0 {
            return 0;
        }
        (qty.floor() as usize).min(self.max_specimens)
    }
}

pub fn decode(schema: &NormSchema, flat: Option<&FlatResultMap>) -> Decoded {
    Decoder::new(schema).decode(flat)
}
