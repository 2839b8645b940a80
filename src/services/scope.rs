//! Scope resolution for fields that do not declare one.
//!
//! An unscoped field follows the record's entry mode: per specimen in
//! implicit multi mode, global otherwise. Every consumer goes through
//! [`effective_scope`] so the policy lives in one place.

use crate::models::{FieldScope, NormField, NormSchema};

pub fn effective_scope(field: &NormField, multi_mode: bool) -> FieldScope {
    match field.scope {
        Some(scope) => scope,
        None if multi_mode => FieldScope::Specimen,
        None => FieldScope::Global,
    }
}

#[derive(Debug, Default)]
pub struct ScopePartition<'a> {
    pub global: Vec<&'a NormField>,
    pub specimen: Vec<&'a NormField>,
}

/// Splits the schema's fields by effective scope, keeping schema order.
pub fn partition(schema: &NormSchema, multi_mode: bool) -> ScopePartition<'_> {
    let mut out = ScopePartition::default();
    for field in schema.fields() {
        match effective_scope(field, multi_mode) {
            FieldScope::Global => out.global.push(field),
            FieldScope::Specimen => out.specimen.push(field),
        }
    }
    out
}

/// Single-mode records of norms without specimen fields keep their values
/// in row 0.
pub fn uses_legacy_row(schema: &NormSchema, multi_mode: bool) -> bool {
    !multi_mode && !schema.has_specimen_fields()
}
