//! Employee record data model.
//!
//! [`EmployeeRecord`] is the unpersisted value the form collects; it doubles
//! as the form's value model. [`StoredEmployee`] pairs a record with the
//! document id the remote store assigned on insert. The core never invents
//! document ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::form::{FormField, FormModel, ValidationSchema};

/// Message reported for any blank employee field.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Fields of the employee form in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmployeeField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "department")]
    Department,
    #[serde(rename = "position")]
    Position,
    #[serde(rename = "employeeID")]
    EmployeeId,
    #[serde(rename = "phone")]
    Phone,
}

impl FormField for EmployeeField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Department,
        Self::Position,
        Self::EmployeeId,
        Self::Phone,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Department => "department",
            Self::Position => "position",
            Self::EmployeeId => "employeeID",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Employee details as typed by the user, before the store assigns an id.
///
/// Values are kept exactly as entered; validation only requires each one to
/// be non-empty after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub name: String,
    pub department: String,
    pub position: String,
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub phone: String,
}

impl FormModel for EmployeeRecord {
    type Field = EmployeeField;

    fn value(&self, field: EmployeeField) -> &str {
        match field {
            EmployeeField::Name => &self.name,
            EmployeeField::Department => &self.department,
            EmployeeField::Position => &self.position,
            EmployeeField::EmployeeId => &self.employee_id,
            EmployeeField::Phone => &self.phone,
        }
    }

    fn value_mut(&mut self, field: EmployeeField) -> &mut String {
        match field {
            EmployeeField::Name => &mut self.name,
            EmployeeField::Department => &mut self.department,
            EmployeeField::Position => &mut self.position,
            EmployeeField::EmployeeId => &mut self.employee_id,
            EmployeeField::Phone => &mut self.phone,
        }
    }

    fn schema() -> ValidationSchema<EmployeeField> {
        ValidationSchema::required(EmployeeField::ALL, REQUIRED_MESSAGE)
    }
}

/// Validation errors returned by [`DocumentId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIdValidationError {
    /// The id was blank.
    #[error("document id must not be empty")]
    Empty,
}

/// Identifier assigned by the remote store to a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and construct a [`DocumentId`].
    pub fn new(id: impl Into<String>) -> Result<Self, DocumentIdValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DocumentIdValidationError::Empty);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Employee record accepted by the remote store.
///
/// Serialises flat: `{ "id": .., "name": .., "employeeID": .., .. }`.
///
/// # Examples
/// ```
/// use employee_directory::domain::{DocumentId, EmployeeRecord, StoredEmployee};
///
/// let id = DocumentId::new("c3").unwrap();
/// let stored = StoredEmployee::new(id, EmployeeRecord::default());
/// assert_eq!(stored.id().as_ref(), "c3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEmployee {
    id: DocumentId,
    #[serde(flatten)]
    record: EmployeeRecord,
}

impl StoredEmployee {
    /// Pair a store-assigned id with the record it identifies.
    #[must_use]
    pub fn new(id: DocumentId, record: EmployeeRecord) -> Self {
        Self { id, record }
    }

    /// Store-assigned document id.
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Field values as submitted.
    #[must_use]
    pub fn record(&self) -> &EmployeeRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests;
