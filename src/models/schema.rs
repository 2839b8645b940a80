use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{NormError, SchemaViolation};
use crate::models::field::{FieldScope, NormField, RawNormField};
use crate::models::results::{is_reserved_key, parse_specimen_key};

/// A test standard: metadata plus an ordered, validated list of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNormSchema", into = "RawNormSchema")]
pub struct NormSchema {
    code: String,
    name: String,
    categories: Vec<String>,
    fields: Vec<NormField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNormSchema {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub fields: Vec<RawNormField>,
}

impl NormSchema {
    pub fn new(
        code: &str,
        name: &str,
        categories: Vec<String>,
        fields: Vec<NormField>,
    ) -> Result<Self, NormError> {
        validate_fields(&fields)?;
        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            categories,
            fields,
        })
    }

    pub fn from_fields(code: &str, fields: Vec<NormField>) -> Result<Self, NormError> {
        Self::new(code, code, Vec::new(), fields)
    }

    /// Shape errors are `MalformedPayload`; content errors stay `InvalidSchema`.
    pub fn from_json(json: &str) -> Result<Self, NormError> {
        let raw: RawNormSchema = serde_json::from_str(json)
            .map_err(|e| NormError::MalformedPayload { reason: e.to_string() })?;
        NormSchema::try_from(raw)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn fields(&self) -> &[NormField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&NormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn require_field(&self, id: &str) -> Result<&NormField, NormError> {
        self.field(id).ok_or_else(|| NormError::UnknownField { field_id: id.to_string() })
    }

    pub fn contains_field(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    pub fn has_specimen_fields(&self) -> bool {
        self.fields.iter().any(|f| f.scope == Some(FieldScope::Specimen))
    }

    /// An empty category list means the norm applies to every category.
    pub fn supports_category(&self, category: &str) -> bool {
        self.categories.is_empty()
            || self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }
}

fn validate_fields(fields: &[NormField]) -> Result<(), NormError> {
    let mut seen = HashSet::new();
    for field in fields {
        field.validate()?;
        if is_reserved_key(&field.id) {
            return Err(NormError::invalid_schema(SchemaViolation::ReservedFieldId(
                field.id.clone(),
            )));
        }
        if !seen.insert(field.id.as_str()) {
            return Err(NormError::invalid_schema(SchemaViolation::DuplicateFieldId(
                field.id.clone(),
            )));
        }
    }

    for field in fields {
        if let Some((prefix, Ok(_))) = parse_specimen_key(&field.id) {
            if seen.contains(prefix) {
                return Err(NormError::invalid_schema(SchemaViolation::AmbiguousSpecimenKey {
                    field_id: field.id.clone(),
                    owner: prefix.to_string(),
                }));
            }
        }
    }
    Ok(())
}

impl TryFrom<RawNormSchema> for NormSchema {
    type Error = NormError;

    fn try_from(raw: RawNormSchema) -> Result<Self, Self::Error> {
        let fields = raw
            .fields
            .into_iter()
            .map(NormField::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        NormSchema::new(&raw.code, &raw.name, raw.categories, fields)
    }
}

impl From<NormSchema> for RawNormSchema {
    fn from(schema: NormSchema) -> Self {
        RawNormSchema {
            code: schema.code,
            name: schema.name,
            categories: schema.categories,
            fields: schema.fields.into_iter().map(RawNormField::from).collect(),
        }
    }
}
