use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NormError, SchemaViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldScope {
    Global,
    Specimen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    Text,
    Boolean,
    Select,
}

/// Unit and acceptance limits of a numeric field. Either limit may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSpec {
    pub unit: Option<String>,
    pub min_limit: Option<f64>,
    pub max_limit: Option<f64>,
}

impl NumberSpec {
    pub fn new(min_limit: Option<f64>, max_limit: Option<f64>) -> Self {
        Self { unit: None, min_limit, max_limit }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Inclusive bounds: only `value < min` or `value > max` fail.
    pub fn within_limits(&self, value: f64) -> bool {
        if let Some(min) = self.min_limit {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max_limit {
            if value > max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Number(NumberSpec),
    Text,
    Boolean,
    Select { options: Vec<String> },
}

impl FieldKind {
    pub fn data_type(&self) -> DataType {
        match self {
            FieldKind::Number(_) => DataType::Number,
            FieldKind::Text => DataType::Text,
            FieldKind::Boolean => DataType::Boolean,
            FieldKind::Select { .. } => DataType::Select,
        }
    }
}

/// One configurable parameter of a test standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNormField", into = "RawNormField")]
pub struct NormField {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub scope: Option<FieldScope>,
}

impl NormField {
    pub fn number(id: &str, name: &str, spec: NumberSpec) -> Self {
        Self::with_kind(id, name, FieldKind::Number(spec))
    }

    pub fn text(id: &str, name: &str) -> Self {
        Self::with_kind(id, name, FieldKind::Text)
    }

    pub fn boolean(id: &str, name: &str) -> Self {
        Self::with_kind(id, name, FieldKind::Boolean)
    }

    pub fn select(id: &str, name: &str, options: &[&str]) -> Self {
        Self::with_kind(
            id,
            name,
            FieldKind::Select { options: options.iter().map(|o| o.to_string()).collect() },
        )
    }

    fn with_kind(id: &str, name: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            required: false,
            scope: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn scoped(mut self, scope: FieldScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn data_type(&self) -> DataType {
        self.kind.data_type()
    }

    pub fn number_spec(&self) -> Option<&NumberSpec> {
        match &self.kind {
            FieldKind::Number(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        self.number_spec().and_then(|spec| spec.unit.as_deref())
    }

    /// Checks that only concern this field in isolation.
    pub fn validate(&self) -> Result<(), NormError> {
        if self.id.is_empty() {
            return Err(NormError::invalid_schema(SchemaViolation::EmptyFieldId));
        }
        match &self.kind {
            FieldKind::Select { options } if options.is_empty() => Err(NormError::invalid_schema(
                SchemaViolation::SelectWithoutOptions(self.id.clone()),
            )),
            FieldKind::Number(NumberSpec { min_limit: Some(min), max_limit: Some(max), .. })
                if min > max =>
            {
                Err(NormError::invalid_schema(SchemaViolation::InvertedLimits {
                    field_id: self.id.clone(),
                    min: *min,
                    max: *max,
                }))
            }
            _ => Ok(()),
        }
    }
}

/// Wire shape of a field as stored by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNormField {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<f64>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<FieldScope>,
}

impl TryFrom<RawNormField> for NormField {
    type Error = NormError;

    fn try_from(raw: RawNormField) -> Result<Self, Self::Error> {
        // Payloads irrelevant to the declared type are dropped here.
        let kind = match raw.data_type {
            DataType::Number => FieldKind::Number(NumberSpec {
                unit: raw.unit,
                min_limit: raw.min_limit,
                max_limit: raw.max_limit,
            }),
            DataType::Text => FieldKind::Text,
            DataType::Boolean => FieldKind::Boolean,
            DataType::Select => FieldKind::Select { options: raw.options },
        };
        let field = NormField {
            id: raw.id,
            name: raw.name,
            kind,
            required: raw.required,
            scope: raw.scope,
        };
        field.validate()?;
        Ok(field)
    }
}

impl From<NormField> for RawNormField {
    fn from(field: NormField) -> Self {
        let data_type = field.data_type();
        let (unit, min_limit, max_limit, options) = match field.kind {
            FieldKind::Number(spec) => (spec.unit, spec.min_limit, spec.max_limit, Vec::new()),
            FieldKind::Select { options } => (None, None, None, options),
            FieldKind::Text | FieldKind::Boolean => (None, None, None, Vec::new()),
        };
        RawNormField {
            id: field.id,
            name: field.name,
            data_type,
            unit,
            min_limit,
            max_limit,
            required: field.required,
            options,
            scope: field.scope,
        }
    }
}

/// A scalar result value as entered or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }

    /// Empty text counts as "not filled" for every data type.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// Numeric reading of the value. Text yields its leading number, so
    /// `"18 MPa"` and `"18,5"` both read as 18.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => leading_number(s.trim()).filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) if s == "true" => Some(true),
            FieldValue::Text(s) if s == "false" => Some(false),
            _ => None,
        }
    }
}

/// Longest prefix of `text` shaped like `[+-]digits[.digits][(e|E)[+-]digits]`.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse::<f64>().ok()
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}
