//! DTOs for Firestore REST documents.
//!
//! Firestore wraps every value in a typed envelope
//! (`{"name": {"stringValue": "Ada"}}`). Employee fields are written as
//! strings; integers written by other clients are accepted on read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    DocumentId, EmployeeField, EmployeeRecord, FormField, FormModel, StoredEmployee,
};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) integer_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListDocumentsDto {
    #[serde(default)]
    pub(super) documents: Vec<DocumentDto>,
    #[serde(default)]
    pub(super) next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DocumentDto {
    pub(super) name: String,
    #[serde(default)]
    pub(super) fields: BTreeMap<String, ValueDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct WriteDocumentDto {
    pub(super) fields: BTreeMap<&'static str, ValueDto>,
}

impl WriteDocumentDto {
    pub(super) fn from_record(record: &EmployeeRecord) -> Self {
        let fields = EmployeeField::ALL
            .iter()
            .map(|field| {
                let value = ValueDto {
                    string_value: Some(record.value(*field).to_owned()),
                    integer_value: None,
                };
                (field.name(), value)
            })
            .collect();
        Self { fields }
    }
}

impl DocumentDto {
    /// Last path segment of the document resource name.
    pub(super) fn document_id(&self) -> Result<DocumentId, String> {
        let segment = self.name.rsplit('/').next().unwrap_or_default();
        DocumentId::new(segment)
            .map_err(|error| format!("document `{}` has no usable id: {error}", self.name))
    }

    pub(super) fn into_stored(mut self) -> Result<StoredEmployee, String> {
        let id = self.document_id()?;
        let mut record = EmployeeRecord::default();
        for field in EmployeeField::ALL {
            let value = self
                .fields
                .remove(field.name())
                .and_then(|value| value.string_value.or(value.integer_value))
                .ok_or_else(|| format!("document `{id}` is missing string field `{field}`"))?;
            *record.value_mut(*field) = value;
        }
        Ok(StoredEmployee::new(id, record))
    }
}

impl ListDocumentsDto {
    /// Decoded records plus the token for the next page, if any.
    ///
    /// Documents that cannot be decoded are logged and skipped.
    pub(super) fn into_page(self) -> (Vec<StoredEmployee>, Option<String>) {
        let records = self
            .documents
            .into_iter()
            .filter_map(|document| {
                document
                    .into_stored()
                    .inspect_err(|error| warn!(%error, "skipping undecodable employee document"))
                    .ok()
            })
            .collect();
        let next = self.next_page_token.filter(|token| !token.is_empty());
        (records, next)
    }
}
