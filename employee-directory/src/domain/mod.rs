//! Domain primitives, state machines and ports.
//!
//! Purpose: hold every piece of the directory feature that does not talk to
//! the network. Adapters live under `outbound`; the presentation layer only
//! sees the serialisable snapshots exported here.
//!
//! Public surface:
//! - `SessionGate` decides whether the feature may mount.
//! - `FormEngine` drives field validation and the submit transition.
//! - `DirectorySync` keeps the persisted record list.
//! - `Dashboard` composes the form and the list for an admitted identity.
//! - `SignInForm` exchanges credentials for a session.

pub mod dashboard;
pub mod directory_sync;
pub mod employee;
pub mod error;
pub mod form;
pub mod identity;
pub mod ports;
pub mod session_gate;
pub mod sign_in;

pub use self::dashboard::{Dashboard, DashboardSnapshot};
pub use self::directory_sync::{DirectorySnapshot, DirectorySync, LoadStatus};
pub use self::employee::{
    DocumentId, DocumentIdValidationError, EmployeeField, EmployeeRecord, REQUIRED_MESSAGE,
    StoredEmployee,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::form::{
    Check, FieldErrors, FieldRule, FormEngine, FormField, FormModel, FormSnapshot, SubmitOutcome,
    ValidationSchema,
};
pub use self::identity::{Identity, IdentityValidationError, UserId};
pub use self::session_gate::{AdmissionDecision, SessionGate};
pub use self::sign_in::{
    SIGN_IN_FALLBACK_MESSAGE, SignInCredentials, SignInField, SignInForm, SignInSnapshot,
};

/// Result alias for fallible domain operations.
///
/// # Examples
/// ```
/// use employee_directory::domain::{DomainResult, Error};
///
/// fn load() -> DomainResult<usize> {
///     Err(Error::load_failed("store offline"))
/// }
/// assert!(load().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
