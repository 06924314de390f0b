//! Tests for the employee data model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn ada() -> EmployeeRecord {
    EmployeeRecord {
        name: "Ada Lovelace".to_owned(),
        department: "Engineering".to_owned(),
        position: "Analyst".to_owned(),
        employee_id: "E-1815".to_owned(),
        phone: "5551234".to_owned(),
    }
}

#[rstest]
fn field_names_match_wire_names() {
    let names: Vec<_> = EmployeeField::ALL.iter().map(|field| field.name()).collect();
    assert_eq!(
        names,
        ["name", "department", "position", "employeeID", "phone"]
    );
}

#[rstest]
fn value_mut_writes_the_addressed_field() {
    let mut record = EmployeeRecord::default();
    *record.value_mut(EmployeeField::EmployeeId) = "42".to_owned();
    assert_eq!(record.employee_id, "42");
    assert_eq!(record.value(EmployeeField::EmployeeId), "42");
    assert!(record.name.is_empty());
}

#[rstest]
fn schema_requires_every_field_once() {
    let schema = EmployeeRecord::schema();
    let fields: Vec<_> = schema.rules().iter().map(|rule| rule.field()).collect();
    assert_eq!(fields, EmployeeField::ALL);
    assert!(schema
        .rules()
        .iter()
        .all(|rule| rule.message() == REQUIRED_MESSAGE));
}

#[rstest]
fn schema_accepts_complete_record(ada: EmployeeRecord) {
    assert!(EmployeeRecord::schema().validate(&ada).is_empty());
}

#[rstest]
fn schema_does_not_check_formats(mut ada: EmployeeRecord) {
    ada.phone = "not a phone number".to_owned();
    ada.employee_id = "???".to_owned();
    assert!(EmployeeRecord::schema().validate(&ada).is_empty());
}

#[rstest]
#[case("")]
#[case("  ")]
#[case("\t\n")]
fn document_id_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(DocumentId::new(raw), Err(DocumentIdValidationError::Empty));
}

#[rstest]
fn stored_employee_serialises_flat(ada: EmployeeRecord) {
    let stored = StoredEmployee::new(DocumentId::new("a").expect("document id"), ada);
    let value = serde_json::to_value(&stored).expect("serialise stored employee");
    assert_eq!(
        value,
        json!({
            "id": "a",
            "name": "Ada Lovelace",
            "department": "Engineering",
            "position": "Analyst",
            "employeeID": "E-1815",
            "phone": "5551234",
        })
    );
}
