//! Domain-level error types.
//!
//! These errors are presentation agnostic. Screen controllers map them to
//! field errors, dismissible notices, or navigation side effects via
//! [`Error::presentation`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::validation::ValidationErrors;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Client-side form validation failed; nothing was sent anywhere.
    Validation,
    /// An owner-scoped operation ran without a signed-in session.
    NotAuthenticated,
    /// The identity provider rejected the email address.
    InvalidEmail,
    /// The identity provider rejected the password as too weak.
    WeakPassword,
    /// An account already exists for the email address.
    EmailInUse,
    /// Email/password pair did not match an account.
    InvalidCredential,
    /// No account exists for the email address.
    UserNotFound,
    /// The requested record does not exist.
    NotFound,
    /// A remote store operation failed.
    StoreError,
    /// The remote service could not be reached in time.
    NetworkError,
}

/// How a screen should surface an [`Error`] to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Show inline messages next to the offending form fields.
    FieldErrors,
    /// Show a dismissible notice and stay on the screen.
    Notice,
    /// Show a notice and return to the services list.
    ReturnToList,
    /// A navigation invariant was broken; log loudly and show a notice.
    InvariantViolation,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use client::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("service 42 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    /// Blank message.
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// # Panics
    /// Panics when `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Field errors carried by a [`ErrorCode::Validation`] error.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        if self.code != ErrorCode::Validation {
            return None;
        }
        self.details
            .as_ref()
            .and_then(|details| serde_json::from_value(details.clone()).ok())
    }

    /// Classify how the error should reach the user.
    pub fn presentation(&self) -> Presentation {
        match self.code {
            ErrorCode::Validation => Presentation::FieldErrors,
            ErrorCode::NotAuthenticated => Presentation::InvariantViolation,
            ErrorCode::NotFound => Presentation::ReturnToList,
            ErrorCode::InvalidEmail
            | ErrorCode::WeakPassword
            | ErrorCode::EmailInUse
            | ErrorCode::InvalidCredential
            | ErrorCode::UserNotFound
            | ErrorCode::StoreError
            | ErrorCode::NetworkError => Presentation::Notice,
        }
    }

    /// Build a [`ErrorCode::Validation`] error carrying every field error.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Error, ErrorCode, FieldError, FieldErrorKind, ValidationErrors};
    ///
    /// let errors = ValidationErrors::from(vec![FieldError::new("email", FieldErrorKind::Required)]);
    /// let err = Error::validation(errors.clone());
    /// assert_eq!(err.code(), ErrorCode::Validation);
    /// assert_eq!(err.field_errors(), Some(errors));
    /// ```
    pub fn validation(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::new(ErrorCode::Validation, errors.to_string()).with_details(details)
    }

    /// Convenience constructor for [`ErrorCode::NotAuthenticated`].
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotAuthenticated, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidEmail`].
    pub fn invalid_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidEmail, message)
    }

    /// Convenience constructor for [`ErrorCode::WeakPassword`].
    pub fn weak_password(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::WeakPassword, message)
    }

    /// Convenience constructor for [`ErrorCode::EmailInUse`].
    pub fn email_in_use(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EmailInUse, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredential`].
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredential, message)
    }

    /// Convenience constructor for [`ErrorCode::UserNotFound`].
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UserNotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::StoreError`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreError, message)
    }

    /// Convenience constructor for [`ErrorCode::NetworkError`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Self::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}
