//! NormForge - norm field engine for construction-material testing labs
//!
//! A norm describes the fields a test records. Persisted results are a flat
//! key/value map; result entry works on [`StructuredResults`], which the
//! [`Decoder`] rebuilds and the [`Encoder`] flattens again. [`evaluate`]
//! derives the sample verdict from the entered values.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use error::{NormError, SchemaViolation};
pub use models::{
    DataType, DecodeNote, FieldKind, FieldScope, FieldValue, FlatResultMap, NormField, NormSchema,
    NumberSpec, SpecimenRow, StructuredResults,
};
pub use services::{
    decode, encode, evaluate, evaluate_detailed, Decoded, Decoder, Encoder, Evaluation,
    QuantityHeuristic, Verdict,
};
