//! Edits to a [`StructuredResults`]. Every operation leaves the input
//! untouched and returns the edited copy.

use crate::error::{NormError, Result};
use crate::models::{FieldValue, SpecimenRow, StructuredResults};

impl StructuredResults {
    pub fn add_specimen(&self) -> Self {
        let mut next = self.clone();
        next.specimen_rows.push(SpecimenRow::new());
        next
    }

    /// Removes row `index`; later rows shift down by one. The last
    /// remaining row cannot be removed.
    pub fn remove_specimen(&self, index: usize) -> Result<Self> {
        let len = self.specimen_rows.len();
        if index >= len {
            return Err(NormError::IndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(NormError::LastSpecimen);
        }
        let mut next = self.clone();
        next.specimen_rows.remove(index);
        Ok(next)
    }

    /// Sets one cell. `index` may address an existing row or the next
    /// append position, never beyond.
    pub fn set_specimen_field(
        &self,
        index: usize,
        field_id: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Self> {
        let len = self.specimen_rows.len();
        if index > len {
            return Err(NormError::IndexOutOfRange { index, len });
        }
        let mut next = self.clone();
        if index == len {
            next.specimen_rows.push(SpecimenRow::new());
        }
        next.specimen_rows[index].insert(field_id.to_string(), value.into());
        Ok(next)
    }

    pub fn clear_specimen_field(&self, index: usize, field_id: &str) -> Result<Self> {
        let len = self.specimen_rows.len();
        if index >= len {
            return Err(NormError::IndexOutOfRange { index, len });
        }
        let mut next = self.clone();
        next.specimen_rows[index].remove(field_id);
        Ok(next)
    }

    /// Sets `field_id` on every existing row.
    pub fn apply_to_all_specimens(&self, field_id: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        for row in &mut next.specimen_rows {
            row.insert(field_id.to_string(), value.clone());
        }
        next
    }

    pub fn set_global(&self, field_id: &str, value: impl Into<FieldValue>) -> Self {
        let mut next = self.clone();
        next.global_values.insert(field_id.to_string(), value.into());
        next
    }

    pub fn clear_global(&self, field_id: &str) -> Self {
        let mut next = self.clone();
        next.global_values.remove(field_id);
        next
    }
}
