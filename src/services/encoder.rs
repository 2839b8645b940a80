//! Flattens structured results into the persisted key/value shape.

use crate::models::results::{specimen_key, MULTI_IMPLICIT_KEY, QTY_KEY};
use crate::models::{FlatResultMap, NormSchema, StructuredResults};
use crate::services::quantity::QuantityHeuristic;

pub struct Encoder<'a> {
    schema: &'a NormSchema,
    heuristic: QuantityHeuristic,
}

impl<'a> Encoder<'a> {
    pub fn new(schema: &'a NormSchema) -> Self {
        Self { schema, heuristic: QuantityHeuristic::default() }
    }

    pub fn with_heuristic(mut self, heuristic: QuantityHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Only values present in `results` are written; nothing is zero-filled.
    pub fn encode(&self, results: &StructuredResults) -> FlatResultMap {
        let mut out = FlatResultMap::new();

        for (field_id, value) in &results.global_values {
            out.insert(field_id.clone(), value.clone());
        }

        for (index, row) in results.specimen_rows.iter().enumerate() {
            for (field_id, value) in row {
                out.insert(specimen_key(field_id, index), value.clone());
            }
        }

        if results.multi_mode {
            out.insert(MULTI_IMPLICIT_KEY, true);
            out.insert(QTY_KEY, results.specimen_count());
        } else if !results.specimen_rows.is_empty() {
            if let Some(field) = self.heuristic.find(self.schema) {
                out.insert(field.id.clone(), results.specimen_count());
            }
        }

        out
    }
}

pub fn encode(schema: &NormSchema, results: &StructuredResults) -> FlatResultMap {
    Encoder::new(schema).encode(results)
}
