//! Authentication forms and validated credentials.
//!
//! Forms hold raw user input. Validation runs entirely on the client through
//! the shared rules and yields either credentials for the identity provider
//! or every field error at once. A form that fails validation must never
//! reach the provider.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::identity::EmailAddress;
use crate::domain::validation::{
    FieldChecks, FieldError, FieldErrorKind, PASSWORD_MIN_LEN, ValidationErrors, email_rule,
    matches_field_rule, min_length_rule, required_rule,
};

/// Field name of the email input on every auth form.
pub const EMAIL_FIELD: &str = "email";
/// Field name of the password input.
pub const PASSWORD_FIELD: &str = "password";
/// Field name of the signup confirmation input.
pub const CONFIRM_PASSWORD_FIELD: &str = "confirmPassword";

/// Validated credentials handed to the identity provider.
///
/// ## Invariants
/// - `email` satisfies the shared email rule.
/// - `password` is non-empty; its buffer is wiped on drop.
///
/// # Examples
/// ```
/// use client::domain::SignInForm;
///
/// let creds = SignInForm::new("ada@example.com", "secret").validate().unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Credentials {
    fn new(email: String, password: &str) -> Result<Self, ValidationErrors> {
        let email = EmailAddress::new(&email).map_err(|_| {
            ValidationErrors::from(vec![FieldError::new(
                EMAIL_FIELD,
                FieldErrorKind::InvalidEmail,
            )])
        })?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used to look up the account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the user.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw input of the signup screen.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Raw email.
    pub email: String,
    /// Chosen password.
    pub password: Zeroizing<String>,
    /// Password typed again.
    pub confirm_password: Zeroizing<String>,
}

impl SignUpForm {
    /// Build a form from raw input.
    pub fn new(email: &str, password: &str, confirm_password: &str) -> Self {
        Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            confirm_password: Zeroizing::new(confirm_password.to_owned()),
        }
    }

    /// Validate every field: email grammar, password length, confirmation.
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut checks = FieldChecks::default();
        let email = checks.check(email_rule(EMAIL_FIELD, &self.email));
        checks.check(required_rule(PASSWORD_FIELD, &self.password));
        if !checks.has_failed(PASSWORD_FIELD) {
            checks.check(min_length_rule(
                PASSWORD_FIELD,
                &self.password,
                PASSWORD_MIN_LEN,
            ));
        }
        checks.check(required_rule(CONFIRM_PASSWORD_FIELD, &self.confirm_password));
        if !checks.has_failed(CONFIRM_PASSWORD_FIELD) {
            checks.check(matches_field_rule(
                CONFIRM_PASSWORD_FIELD,
                &self.confirm_password,
                PASSWORD_FIELD,
                &self.password,
            ));
        }
        checks.finish()?;
        Credentials::new(email.unwrap_or_default(), &self.password)
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Raw input of the login screen.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    /// Raw email.
    pub email: String,
    /// Password.
    pub password: Zeroizing<String>,
}

impl SignInForm {
    /// Build a form from raw input.
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        }
    }

    /// Validate the email grammar and require a password.
    ///
    /// Existing accounts may predate the signup length rule, so only
    /// presence is checked here.
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut checks = FieldChecks::default();
        let email = checks.check(email_rule(EMAIL_FIELD, &self.email));
        if self.password.is_empty() {
            checks.check::<()>(Err(FieldError::new(
                PASSWORD_FIELD,
                FieldErrorKind::Required,
            )));
        }
        checks.finish()?;
        Credentials::new(email.unwrap_or_default(), &self.password)
    }
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Raw input of the forgot-password screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordResetForm {
    /// Email of the account to reset.
    pub email: String,
}

impl PasswordResetForm {
    /// Build a form from raw input.
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_owned(),
        }
    }

    /// Validate the email grammar.
    pub fn validate(&self) -> Result<EmailAddress, ValidationErrors> {
        let email = email_rule(EMAIL_FIELD, &self.email)
            .map_err(|error| ValidationErrors::from(vec![error]))?;
        EmailAddress::new(email).map_err(|_| {
            ValidationErrors::from(vec![FieldError::new(
                EMAIL_FIELD,
                FieldErrorKind::InvalidEmail,
            )])
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn failing_fields(errors: &ValidationErrors) -> Vec<(String, FieldErrorKind)> {
        errors
            .iter()
            .map(|error| (error.field().to_owned(), error.kind().clone()))
            .collect()
    }

    #[rstest]
    fn signup_accepts_matching_passwords() {
        let creds = SignUpForm::new("new@test.com", "abc123", "abc123")
            .validate()
            .expect("valid signup");
        assert_eq!(creds.email().as_ref(), "new@test.com");
        assert_eq!(creds.password(), "abc123");
    }

    #[rstest]
    fn signup_rejects_mismatched_confirmation() {
        let errors = SignUpForm::new("a@test.com", "abc123", "xyz987")
            .validate()
            .expect_err("mismatch");
        assert_eq!(
            failing_fields(&errors),
            vec![(
                CONFIRM_PASSWORD_FIELD.to_owned(),
                FieldErrorKind::Mismatch {
                    other: PASSWORD_FIELD.to_owned()
                }
            )]
        );
    }

    #[rstest]
    fn signup_reports_every_failing_field() {
        let errors = SignUpForm::new("not-an-email", "abc", "")
            .validate()
            .expect_err("invalid form");
        assert_eq!(
            failing_fields(&errors),
            vec![
                (EMAIL_FIELD.to_owned(), FieldErrorKind::InvalidEmail),
                (
                    PASSWORD_FIELD.to_owned(),
                    FieldErrorKind::TooShort {
                        min: PASSWORD_MIN_LEN
                    }
                ),
                (CONFIRM_PASSWORD_FIELD.to_owned(), FieldErrorKind::Required),
            ]
        );
    }

    #[rstest]
    #[case("", "pw", EMAIL_FIELD, FieldErrorKind::Required)]
    #[case("ada@example", "pw", EMAIL_FIELD, FieldErrorKind::InvalidEmail)]
    #[case("ada@example.com", "", PASSWORD_FIELD, FieldErrorKind::Required)]
    fn sign_in_validation(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] kind: FieldErrorKind,
    ) {
        let errors = SignInForm::new(email, password)
            .validate()
            .expect_err("invalid sign in");
        assert_eq!(errors.for_field(field).map(FieldError::kind), Some(&kind));
    }

    #[rstest]
    fn sign_in_allows_short_legacy_passwords() {
        let creds = SignInForm::new("ada@example.com", "abc")
            .validate()
            .expect("presence only");
        assert_eq!(creds.password(), "abc");
    }

    #[rstest]
    fn password_reset_requires_valid_email() {
        assert!(PasswordResetForm::new("ada@").validate().is_err());
        let email = PasswordResetForm::new(" ada@example.com ")
            .validate()
            .expect("valid email");
        assert_eq!(email.as_ref(), "ada@example.com");
    }

    #[rstest]
    fn debug_output_redacts_passwords() {
        let form = SignUpForm::new("ada@example.com", "hunter22", "hunter22");
        let creds = form.validate().expect("valid");
        assert!(!format!("{form:?}").contains("hunter22"));
        assert!(!format!("{creds:?}").contains("hunter22"));
    }
}
