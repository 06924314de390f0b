//! Field-level validation state machine backing every form in the feature.
//!
//! [`FormEngine`] owns the values, touched set, error map and submitting flag
//! of one form session. Operations take `&self`: state sits behind a short
//! lock that is released before the persistence call is awaited, so the
//! presentation layer can keep reading snapshots while a submit is pending.
//!
//! Errors are computed for the whole record on every change, blur and submit,
//! but only errors for touched fields are visible through the public surface.

mod schema;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

pub use self::schema::{Check, FieldRule, ValidationSchema};

/// Validation messages keyed by field.
pub type FieldErrors<F> = BTreeMap<F, &'static str>;

/// Closed set of fields belonging to one form model.
pub trait FormField: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every field in display order.
    const ALL: &'static [Self];

    /// Stable field name used by the presentation layer.
    fn name(self) -> &'static str;
}

/// Value model driven by a [`FormEngine`].
///
/// `Default` must produce the empty initial record the form starts from and
/// resets to after a successful submit.
pub trait FormModel: Clone + Default + Send + Sync + 'static {
    /// Field enumeration for this model.
    type Field: FormField;

    /// Borrow the raw value of `field`.
    fn value(&self, field: Self::Field) -> &str;

    /// Mutable access to the raw value of `field`.
    fn value_mut(&mut self, field: Self::Field) -> &mut String;

    /// Ordered validation rules applied to this model.
    fn schema() -> ValidationSchema<Self::Field>;
}

/// Result of a [`FormEngine::submit`] call that did not fail remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<F, T> {
    /// Validation passed and the persistence call succeeded; the form reset.
    Persisted(T),
    /// Validation failed; carries the errors now visible on the form.
    Rejected(FieldErrors<F>),
    /// Another submit is still in flight; nothing happened.
    AlreadySubmitting,
}

impl<F, T> SubmitOutcome<F, T> {
    /// Return the persistence output when the submit went through.
    #[must_use]
    pub fn into_persisted(self) -> Option<T> {
        match self {
            Self::Persisted(output) => Some(output),
            Self::Rejected(_) | Self::AlreadySubmitting => None,
        }
    }
}

/// Read-only view of a form handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "M: Serialize, M::Field: Serialize"))]
pub struct FormSnapshot<M: FormModel> {
    /// Current raw values.
    pub values: M,
    /// Fields the user has interacted with.
    pub touched: BTreeSet<M::Field>,
    /// Errors for touched fields only.
    pub errors: FieldErrors<M::Field>,
    /// Whether a persistence call is in flight.
    pub submitting: bool,
}

#[derive(Debug)]
struct FormState<M: FormModel> {
    values: M,
    touched: BTreeSet<M::Field>,
    errors: FieldErrors<M::Field>,
    submitting: bool,
}

impl<M: FormModel> FormState<M> {
    fn initial() -> Self {
        Self {
            values: M::default(),
            touched: BTreeSet::new(),
            errors: FieldErrors::new(),
            submitting: false,
        }
    }

    fn visible_errors(&self) -> FieldErrors<M::Field> {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(field))
            .map(|(field, message)| (*field, *message))
            .collect()
    }
}

/// Validation and submit state machine for one form session.
///
/// # Examples
/// ```
/// use employee_directory::domain::{EmployeeField, EmployeeRecord, FormEngine};
///
/// let form = FormEngine::<EmployeeRecord>::new();
/// form.blur_field(EmployeeField::Name);
/// assert_eq!(form.error(EmployeeField::Name), Some("Required"));
/// assert_eq!(form.error(EmployeeField::Phone), None);
/// ```
pub struct FormEngine<M: FormModel> {
    schema: ValidationSchema<M::Field>,
    state: Mutex<FormState<M>>,
}

impl<M: FormModel> Default for FormEngine<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: FormModel> fmt::Debug for FormEngine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("FormEngine")
            .field("touched", &state.touched)
            .field("submitting", &state.submitting)
            .finish_non_exhaustive()
    }
}

impl<M: FormModel> FormEngine<M> {
    /// Mount a form with empty values and nothing touched.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: M::schema(),
            state: Mutex::new(FormState::initial()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the raw value of `field`.
    ///
    /// The internal error map is recomputed, but the field is not marked
    /// touched, so an untouched field stays free of visible errors.
    pub fn set_field(&self, field: M::Field, raw: impl Into<String>) {
        let mut state = self.state();
        *state.values.value_mut(field) = raw.into();
        state.errors = self.schema.validate(&state.values);
    }

    /// Mark `field` touched and revalidate the whole record.
    pub fn blur_field(&self, field: M::Field) {
        let mut state = self.state();
        state.touched.insert(field);
        state.errors = self.schema.validate(&state.values);
    }

    /// Validate everything and, when clean, hand the values to `persist`.
    ///
    /// All fields become touched. With validation errors the call returns
    /// [`SubmitOutcome::Rejected`] without invoking `persist`. While a
    /// previous submit is still pending the call is a no-op returning
    /// [`SubmitOutcome::AlreadySubmitting`].
    ///
    /// On success the form resets to its initial state. On failure the
    /// submitting flag clears, values and touched fields are kept, and the
    /// error from `persist` is returned.
    pub async fn submit<P, Fut, T, E>(&self, persist: P) -> Result<SubmitOutcome<M::Field, T>, E>
    where
        P: FnOnce(M) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let values = {
            let mut state = self.state();
            if state.submitting {
                return Ok(SubmitOutcome::AlreadySubmitting);
            }
            state
                .touched
                .extend(<M::Field as FormField>::ALL.iter().copied());
            state.errors = self.schema.validate(&state.values);
            if !state.errors.is_empty() {
                return Ok(SubmitOutcome::Rejected(state.visible_errors()));
            }
            state.submitting = true;
            state.values.clone()
        };

        match persist(values).await {
            Ok(output) => {
                *self.state() = FormState::initial();
                Ok(SubmitOutcome::Persisted(output))
            }
            Err(error) => {
                self.state().submitting = false;
                Err(error)
            }
        }
    }

    /// Current values.
    #[must_use]
    pub fn values(&self) -> M {
        self.state().values.clone()
    }

    /// Whether `field` has been touched.
    #[must_use]
    pub fn is_touched(&self, field: M::Field) -> bool {
        self.state().touched.contains(&field)
    }

    /// Visible error for `field`, if it is touched and failing.
    #[must_use]
    pub fn error(&self, field: M::Field) -> Option<&'static str> {
        let state = self.state();
        if !state.touched.contains(&field) {
            return None;
        }
        state.errors.get(&field).copied()
    }

    /// Errors for touched fields.
    #[must_use]
    pub fn visible_errors(&self) -> FieldErrors<M::Field> {
        self.state().visible_errors()
    }

    /// Whether a persistence call is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    /// Copy of the presentation-facing state.
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot<M> {
        let state = self.state();
        FormSnapshot {
            values: state.values.clone(),
            touched: state.touched.clone(),
            errors: state.visible_errors(),
            submitting: state.submitting,
        }
    }
}
