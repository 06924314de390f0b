//! Declarative validation schema evaluated uniformly over a form model.
//!
//! A schema is an ordered list of `(field, check, message)` rules. Evaluation
//! walks the list once; the first failing rule for a field supplies that
//! field's message and later rules for the same field are skipped.

use std::sync::OnceLock;

use regex::Regex;

use super::{FieldErrors, FormField, FormModel};

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Predicate applied to a single raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Value must be non-empty once trimmed.
    Required,
    /// Value must look like an e-mail address. Empty values pass so that a
    /// preceding [`Check::Required`] owns the "missing" message.
    Email,
    /// Value must contain at least this many characters. Empty values pass.
    MinChars(usize),
}

impl Check {
    /// Return `true` when `value` satisfies the check.
    #[must_use]
    pub fn passes(self, value: &str) -> bool {
        match self {
            Self::Required => !value.trim().is_empty(),
            Self::Email => value.is_empty() || email_regex().is_match(value),
            Self::MinChars(min) => value.is_empty() || value.chars().count() >= min,
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule<F> {
    field: F,
    check: Check,
    message: &'static str,
}

impl<F: FormField> FieldRule<F> {
    /// Field the rule applies to.
    #[must_use]
    pub fn field(&self) -> F {
        self.field
    }

    /// Predicate evaluated against the field value.
    #[must_use]
    pub fn check(&self) -> Check {
        self.check
    }

    /// Message reported when the check fails.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Ordered validation rules for one form model.
///
/// # Examples
/// ```
/// use employee_directory::domain::{
///     Check, EmployeeField, EmployeeRecord, FormField, ValidationSchema,
/// };
///
/// let schema = ValidationSchema::required(EmployeeField::ALL, "Required");
/// let errors = schema.validate(&EmployeeRecord::default());
/// assert_eq!(errors.len(), EmployeeField::ALL.len());
/// assert!(schema.rules().iter().all(|rule| rule.check() == Check::Required));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSchema<F> {
    rules: Vec<FieldRule<F>>,
}

impl<F: FormField> Default for ValidationSchema<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormField> ValidationSchema<F> {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build a schema marking each of `fields` as required with one message.
    #[must_use]
    pub fn required(fields: &[F], message: &'static str) -> Self {
        fields
            .iter()
            .fold(Self::new(), |schema, field| schema.rule(*field, Check::Required, message))
    }

    /// Append a rule to the end of the schema.
    #[must_use]
    pub fn rule(mut self, field: F, check: Check, message: &'static str) -> Self {
        self.rules.push(FieldRule {
            field,
            check,
            message,
        });
        self
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule<F>] {
        self.rules.as_slice()
    }

    /// Evaluate every rule against `values` and collect one message per
    /// failing field.
    pub fn validate<M>(&self, values: &M) -> FieldErrors<F>
    where
        M: FormModel<Field = F>,
    {
        let mut errors = FieldErrors::new();
        for rule in &self.rules {
            if errors.contains_key(&rule.field) {
                continue;
            }
            if !rule.check.passes(values.value(rule.field)) {
                errors.insert(rule.field, rule.message);
            }
        }
        errors
    }
}
