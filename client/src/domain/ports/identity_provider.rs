//! Driven port for the external identity provider.
//!
//! The provider owns accounts and the authoritative session. Besides the
//! request/response calls it exposes a stream of session notifications whose
//! first item is the current state; the session store follows that stream.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::domain::{EmailAddress, Identity, UserId};

use super::define_port_error;

/// Session notifications: `Some` when signed in, `None` when signed out.
pub type SessionEvents = BoxStream<'static, Option<Identity>>;

define_port_error! {
    /// Errors reported by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider rejected the email address.
        InvalidEmail { message: String } => "identity provider rejected email: {message}",
        /// The password does not meet the provider's strength policy.
        WeakPassword { message: String } => "identity provider rejected password: {message}",
        /// An account already exists for the email address.
        EmailInUse { message: String } => "email already registered: {message}",
        /// Email and password do not match.
        InvalidCredential { message: String } => "invalid credentials: {message}",
        /// No account exists for the email address.
        UserNotFound { message: String } => "no account for {message}",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// Any other provider-side failure.
        Rejected { message: String } => "identity provider request failed: {message}",
    }
}

/// Port for account and session operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityProviderError>;

    /// Sign in an existing account.
    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityProviderError>;

    /// Send a password reset email.
    async fn send_password_reset(&self, email: &EmailAddress) -> Result<(), IdentityProviderError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), IdentityProviderError>;

    /// Identity of the current session, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Stream of session notifications, starting with the current state.
    fn session_events(&self) -> SessionEvents;
}

/// Fixture provider that accepts every request for a single fixed account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

impl FixtureIdentityProvider {
    fn identity(email: &EmailAddress) -> Result<Identity, IdentityProviderError> {
        let user_id = UserId::new("fixture-user")
            .map_err(|err| IdentityProviderError::rejected(format!("invalid fixture id: {err}")))?;
        Ok(Identity::new(user_id, email.clone()))
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn sign_up(
        &self,
        email: &EmailAddress,
        _password: &str,
    ) -> Result<Identity, IdentityProviderError> {
        Self::identity(email)
    }

    async fn sign_in(
        &self,
        email: &EmailAddress,
        _password: &str,
    ) -> Result<Identity, IdentityProviderError> {
        Self::identity(email)
    }

    async fn send_password_reset(&self, _email: &EmailAddress) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        None
    }

    fn session_events(&self) -> SessionEvents {
        stream::iter([None]).boxed()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_signs_in_any_email() {
        let email = EmailAddress::new("ada@example.com").expect("email");
        let identity = FixtureIdentityProvider
            .sign_in(&email, "whatever")
            .await
            .expect("fixture sign in");
        assert_eq!(identity.email(), &email);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_signed_out_session() {
        let events: Vec<_> = FixtureIdentityProvider.session_events().collect().await;
        assert_eq!(events, vec![None]);
    }
}
