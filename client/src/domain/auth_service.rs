//! Authentication domain service.
//!
//! Implements the [`Authentication`] driving port on top of an
//! [`IdentityProvider`]. Forms are validated first; a rejected form never
//! reaches the provider. Calls are single shot and bounded by the store
//! timeout. Successful outcomes are applied to the session store straight
//! away; the provider's own notification that follows is then a no-op.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::deadline::within;
use crate::domain::ports::{Authentication, IdentityProvider, IdentityProviderError};
use crate::domain::{
    Error, Identity, PasswordResetForm, SessionStore, SignInForm, SignUpForm,
};

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidEmail { message } => {
            Error::invalid_email(format!("email address was rejected: {message}"))
        }
        IdentityProviderError::WeakPassword { message } => {
            Error::weak_password(format!("password is too weak: {message}"))
        }
        IdentityProviderError::EmailInUse { message } => {
            Error::email_in_use(format!("an account already exists for {message}"))
        }
        IdentityProviderError::InvalidCredential { message } => {
            Error::invalid_credential(format!("email or password is incorrect: {message}"))
        }
        IdentityProviderError::UserNotFound { message } => {
            Error::user_not_found(format!("no account found for {message}"))
        }
        IdentityProviderError::Unavailable { message } => {
            Error::network(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Rejected { message } => {
            Error::network(format!("identity provider request failed: {message}"))
        }
    }
}

/// Authentication service backed by an identity provider.
#[derive(Clone)]
pub struct AuthService<P> {
    provider: Arc<P>,
    session: SessionStore,
    timeout: Duration,
}

impl<P> AuthService<P> {
    /// Create the service.
    pub fn new(provider: Arc<P>, session: SessionStore, timeout: Duration) -> Self {
        Self {
            provider,
            session,
            timeout,
        }
    }
}

#[async_trait]
impl<P> Authentication for AuthService<P>
where
    P: IdentityProvider,
{
    async fn sign_up(&self, form: &SignUpForm) -> Result<Identity, Error> {
        let credentials = form.validate().map_err(Error::validation)?;
        debug!(email = %credentials.email(), "signing up");
        let identity = within(
            self.timeout,
            "sign_up",
            self.provider
                .sign_up(credentials.email(), credentials.password()),
            map_provider_error,
        )
        .await?;
        self.session.apply(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, Error> {
        let credentials = form.validate().map_err(Error::validation)?;
        debug!(email = %credentials.email(), "signing in");
        let identity = within(
            self.timeout,
            "sign_in",
            self.provider
                .sign_in(credentials.email(), credentials.password()),
            map_provider_error,
        )
        .await?;
        self.session.apply(Some(identity.clone()));
        Ok(identity)
    }

    async fn send_password_reset(&self, form: &PasswordResetForm) -> Result<(), Error> {
        let email = form.validate().map_err(Error::validation)?;
        debug!(%email, "requesting password reset");
        within(
            self.timeout,
            "send_password_reset",
            self.provider.send_password_reset(&email),
            map_provider_error,
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), Error> {
        within(
            self.timeout,
            "sign_out",
            self.provider.sign_out(),
            map_provider_error,
        )
        .await?;
        self.session.apply(None);
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
