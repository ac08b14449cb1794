//! Part Draft
//!
//! In-memory form state for an open add or edit dialog. A draft is an
//! explicit value replaced wholesale on each change; nothing in this module
//! touches the network.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};
use super::part::Part;

/// Editable scalar fields of a part, as the form holds them
///
/// `quantity` stays a raw string until the record is built; the location
/// fields are numeric-only in the UI but free text here and at rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDraft {
    pub part_name: String,
    pub quantity: String,
    pub cabinet_name: String,
    pub shelf_row: String,
    pub shelf_column: String,
    pub remarks: String,
}

impl PartDraft {
    /// Seed a draft from an existing record for editing. Image fields stay
    /// on the record; the edit surface never exposes them.
    pub fn from_part(part: &Part) -> Self {
        Self {
            part_name: part.part_name.clone(),
            quantity: part.quantity.to_string(),
            cabinet_name: part.cabinet_name.clone(),
            shelf_row: part.shelf_row.clone(),
            shelf_column: part.shelf_column.clone(),
            remarks: part.remarks.clone(),
        }
    }

    /// Add-dialog rule: only the part name is required.
    pub fn validate_new(&self) -> DomainResult<()> {
        if self.part_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("part name is required".into()));
        }
        Ok(())
    }

    /// Edit-dialog rule: every field except remarks is required.
    pub fn validate_update(&self) -> DomainResult<()> {
        let required = [
            ("part name", &self.part_name),
            ("quantity", &self.quantity),
            ("cabinet name", &self.cabinet_name),
            ("shelf row", &self.shelf_row),
            ("shelf column", &self.shelf_column),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!("{} is required", label)));
            }
        }
        Ok(())
    }

    /// Parsed quantity; anything unparsable counts as 0.
    pub fn parsed_quantity(&self) -> i64 {
        self.quantity.trim().parse().unwrap_or(0)
    }

    /// Append a speech-to-text fragment to the remarks field.
    pub fn append_remarks(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        if self.remarks.is_empty() {
            self.remarks = fragment.to_string();
        } else {
            self.remarks = format!("{} {}", self.remarks, fragment);
        }
    }

    /// Build the replacement record for an update: `original` copied with
    /// only the editable scalars overwritten. Image fields and creation
    /// time carry through verbatim.
    pub fn apply_to(&self, original: &Part) -> Part {
        Part {
            part_name: self.part_name.trim().to_string(),
            quantity: self.parsed_quantity(),
            cabinet_name: self.cabinet_name.trim().to_string(),
            shelf_row: self.shelf_row.trim().to_string(),
            shelf_column: self.shelf_column.trim().to_string(),
            remarks: self.remarks.trim().to_string(),
            ..original.clone()
        }
    }
}
