//! Driving port for the authentication screens.
//!
//! Screen controllers call this port with raw form input; implementations
//! validate locally before touching the identity provider.

use async_trait::async_trait;

use crate::domain::{Error, Identity, PasswordResetForm, SignInForm, SignUpForm};

/// Use-case port for account access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authentication: Send + Sync {
    /// Register a new account and sign it in.
    async fn sign_up(&self, form: &SignUpForm) -> Result<Identity, Error>;

    /// Sign in an existing account.
    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, Error>;

    /// Ask the provider to email a password reset link.
    async fn send_password_reset(&self, form: &PasswordResetForm) -> Result<(), Error>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), Error>;
}
