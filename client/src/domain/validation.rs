//! Shared form validation rules.
//!
//! Every form in the client validates through these named rules so the
//! screens cannot drift apart (for example on the minimum password length).
//! Rules check one field and return a [`FieldError`]; [`FieldChecks`] collects
//! the first failure per field so a form reports all of its fields at once.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// The field is blank.
    Required,
    /// The value is not an email address.
    InvalidEmail,
    /// The value is shorter than `min` characters.
    TooShort { min: usize },
    /// The value differs from the field named `other`.
    Mismatch { other: String },
    /// The value is not a number.
    NotANumber,
    /// The value is not a whole number.
    NotAnInteger,
    /// The number is zero or negative.
    NotPositive,
    /// The number falls outside `min..=max`.
    OutOfRange { min: i64, max: i64 },
    /// The value is not one of the accepted options.
    UnknownOption,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::InvalidEmail => write!(f, "must be a valid email address"),
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::Mismatch { other } => write!(f, "must match {other}"),
            Self::NotANumber => write!(f, "must be a number"),
            Self::NotAnInteger => write!(f, "must be a whole number"),
            Self::NotPositive => write!(f, "must be positive"),
            Self::OutOfRange { min, max } => write!(f, "must be between {min} and {max}"),
            Self::UnknownOption => write!(f, "is not an accepted option"),
        }
    }
}

/// A validation failure attached to a named form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    field: String,
    kind: FieldErrorKind,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Failure reason.
    pub fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}

/// Every field error produced by one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the field errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Error recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field() == field)
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(value: Vec<FieldError>) -> Self {
        Self(value)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "form is invalid");
        }
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects rule results for a whole form, keeping the first failure per field.
///
/// # Examples
/// ```
/// use client::domain::validation::{FieldChecks, email_rule, required_rule};
///
/// let mut checks = FieldChecks::default();
/// let email = checks.check(email_rule("email", "ada@example.com"));
/// checks.check(required_rule("password", ""));
/// assert_eq!(email.as_deref(), Some("ada@example.com"));
/// assert!(checks.finish().is_err());
/// ```
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    /// Record a rule result, returning the validated value on success.
    ///
    /// A second failure for a field that already failed is dropped.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                if self.errors.iter().all(|known| known.field != error.field) {
                    self.errors.push(error);
                }
                None
            }
        }
    }

    /// True when `field` already failed.
    pub fn has_failed(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Finish the form, returning every collected error.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Dotted domain labels are required; single-label hosts are rejected.
        let pattern = concat!(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
            r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        );
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// The value must contain something other than whitespace.
pub fn required_rule(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, FieldErrorKind::Required));
    }
    Ok(trimmed.to_owned())
}

/// The value must be a required, well-formed email address.
pub fn email_rule(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = required_rule(field, value)?;
    if !email_regex().is_match(&trimmed) {
        return Err(FieldError::new(field, FieldErrorKind::InvalidEmail));
    }
    Ok(trimmed)
}

/// The value must be at least `min` characters long. Whitespace is kept.
pub fn min_length_rule(field: &str, value: &str, min: usize) -> Result<(), FieldError> {
    if value.chars().count() < min {
        return Err(FieldError::new(field, FieldErrorKind::TooShort { min }));
    }
    Ok(())
}

/// The value must equal the value of `other_field`.
pub fn matches_field_rule(
    field: &str,
    value: &str,
    other_field: &str,
    other_value: &str,
) -> Result<(), FieldError> {
    if value != other_value {
        return Err(FieldError::new(
            field,
            FieldErrorKind::Mismatch {
                other: other_field.to_owned(),
            },
        ));
    }
    Ok(())
}

/// The value must parse as a finite number greater than zero.
pub fn positive_number_rule(field: &str, value: &str) -> Result<f64, FieldError> {
    let trimmed = required_rule(field, value)?;
    let number = trimmed
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| FieldError::new(field, FieldErrorKind::NotANumber))?;
    if number <= 0.0 {
        return Err(FieldError::new(field, FieldErrorKind::NotPositive));
    }
    Ok(number)
}

/// The value must parse as a whole number within `min..=max`.
pub fn integer_range_rule(field: &str, value: &str, min: i64, max: i64) -> Result<i64, FieldError> {
    let trimmed = required_rule(field, value)?;
    let number = trimmed
        .parse::<i64>()
        .map_err(|_| FieldError::new(field, FieldErrorKind::NotAnInteger))?;
    if !(min..=max).contains(&number) {
        return Err(FieldError::new(field, FieldErrorKind::OutOfRange { min, max }));
    }
    Ok(number)
}
