//! Conformance verdict for a sample's entered results.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::{FieldValue, NormField, NormSchema, StructuredResults};
use crate::services::scope::{partition, uses_legacy_row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    EnProceso,
    Aprobado,
    Rechazado,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::EnProceso => "en_proceso",
            Verdict::Aprobado => "aprobado",
            Verdict::Rechazado => "rechazado",
        }
    }

    /// Complete records are either approved or rejected.
    pub fn is_complete(&self) -> bool {
        !matches!(self, Verdict::EnProceso)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValue {
    pub field_id: String,
    pub specimen: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitViolation {
    pub field_id: String,
    pub specimen: Option<usize>,
    pub value: f64,
    pub min_limit: Option<f64>,
    pub max_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub missing: Vec<MissingValue>,
    pub violations: Vec<LimitViolation>,
}

impl Evaluation {
    fn check(&mut self, field: &NormField, value: Option<&FieldValue>, specimen: Option<usize>) {
        let value = match value {
            Some(v) if !v.is_blank() => v,
            _ => {
                if field.required {
                    self.missing.push(MissingValue { field_id: field.id.clone(), specimen });
                }
                return;
            }
        };

        let Some(spec) = field.number_spec() else {
            return;
        };
        match value.as_f64() {
            Some(number) if !spec.within_limits(number) => self.violations.push(LimitViolation {
                field_id: field.id.clone(),
                specimen,
                value: number,
                min_limit: spec.min_limit,
                max_limit: spec.max_limit,
            }),
            Some(_) => {}
            None => {
                debug!(field = %field.id, value = %value, "non-numeric value skips limit check")
            }
        }
    }
}

pub fn evaluate_detailed(schema: &NormSchema, results: &StructuredResults) -> Evaluation {
    let mut eval = Evaluation {
        verdict: Verdict::EnProceso,
        missing: Vec::new(),
        violations: Vec::new(),
    };
    let scopes = partition(schema, results.multi_mode);

    let legacy_row = if uses_legacy_row(schema, results.multi_mode) {
        results.specimen_rows.first()
    } else {
        None
    };
    for field in &scopes.global {
        let value = results
            .global(&field.id)
            .or_else(|| legacy_row.and_then(|row| row.get(&field.id)));
        eval.check(field, value, None);
    }

    if !scopes.specimen.is_empty() {
        for (index, row) in results.specimen_rows.iter().enumerate() {
            for field in &scopes.specimen {
                eval.check(field, row.get(&field.id), Some(index));
            }
        }
    }

    eval.verdict = if !eval.missing.is_empty() {
        Verdict::EnProceso
    } else if !eval.violations.is_empty() {
        Verdict::Rechazado
    } else {
        Verdict::Aprobado
    };

    debug!(
        norm = %schema.code(),
        specimens = results.specimen_count(),
        missing = eval.missing.len(),
        violations = eval.violations.len(),
        verdict = %eval.verdict,
        "evaluated results"
    );
    eval
}

pub fn evaluate(schema: &NormSchema, results: &StructuredResults) -> Verdict {
    evaluate_detailed(schema, results).verdict
}
