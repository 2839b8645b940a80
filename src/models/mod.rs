pub mod field;
pub mod results;
pub mod schema;

pub use field::{DataType, FieldKind, FieldScope, FieldValue, NormField, NumberSpec};
pub use results::{DecodeNote, FlatResultMap, SpecimenRow, StructuredResults};
pub use schema::NormSchema;
