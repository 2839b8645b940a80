//! Detection of the legacy "number of specimens" field.
//!
//! Older norms carry an explicit count field such as "Número de Cilindros".
//! It is recognised by a case-insensitive substring match of the field's id
//! or name against a keyword list. When nothing matches the norm has no
//! quantity field and no count is written.

use crate::config::EngineConfig;
use crate::models::{DataType, FieldScope, NormField, NormSchema};

#[derive(Debug, Clone, PartialEq)]
pub struct QuantityHeuristic {
    keywords: Vec<String>,
}

impl Default for QuantityHeuristic {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl QuantityHeuristic {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.quantity_keywords)
    }

    /// Only numeric fields that are not per-specimen qualify.
    pub fn is_quantity_field(&self, field: &NormField) -> bool {
        if field.data_type() != DataType::Number || field.scope == Some(FieldScope::Specimen) {
            return false;
        }
        let id = field.id.to_lowercase();
        let name = field.name.to_lowercase();
        self.keywords.iter().any(|k| id.contains(k.as_str()) || name.contains(k.as_str()))
    }

    /// First matching field in schema order.
    pub fn find<'a>(&self, schema: &'a NormSchema) -> Option<&'a NormField> {
        schema.fields().iter().find(|f| self.is_quantity_field(f))
    }
}
