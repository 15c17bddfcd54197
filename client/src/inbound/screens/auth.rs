//! Login, signup, and forgot-password screens.
//!
//! A successful sign-in or sign-up switches the session to the app graph,
//! which unmounts these screens; their outcome is then
//! [`Outcome::Discarded`] and the new session is visible on the navigator.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::Authentication;
use crate::domain::{Identity, PasswordResetForm, Route, SignInForm, SignUpForm};

use super::context::{Outcome, ScreenContext};
use super::form::FormState;

/// Controller of the login screen.
pub struct LoginScreen {
    context: ScreenContext,
    auth: Arc<dyn Authentication>,
    form: FormState<SignInForm>,
}

impl LoginScreen {
    /// Mount the screen with an empty form.
    pub fn new(context: ScreenContext, auth: Arc<dyn Authentication>) -> Self {
        Self {
            context,
            auth,
            form: FormState::new(SignInForm::default()),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Form state.
    pub fn form(&self) -> &FormState<SignInForm> {
        &self.form
    }

    /// Sign in with the current input.
    pub async fn submit(&self) -> Outcome<Identity> {
        let input = self.form.input();
        self.context
            .run(
                "sign_in",
                self.form.guard(),
                self.form.feedback_slot(),
                self.auth.sign_in(&input),
            )
            .await
    }

    /// Follow the "create account" link.
    pub fn open_signup(&self) -> bool {
        self.context.navigate(Route::Signup)
    }

    /// Follow the "forgot password" link.
    pub fn open_forgot_password(&self) -> bool {
        self.context.navigate(Route::ForgotPassword)
    }
}

/// Controller of the signup screen.
pub struct SignupScreen {
    context: ScreenContext,
    auth: Arc<dyn Authentication>,
    form: FormState<SignUpForm>,
}

impl SignupScreen {
    /// Mount the screen with an empty form.
    pub fn new(context: ScreenContext, auth: Arc<dyn Authentication>) -> Self {
        Self {
            context,
            auth,
            form: FormState::new(SignUpForm::default()),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Form state.
    pub fn form(&self) -> &FormState<SignUpForm> {
        &self.form
    }

    /// Create the account and sign it in.
    pub async fn submit(&self) -> Outcome<Identity> {
        let input = self.form.input();
        self.context
            .run(
                "sign_up",
                self.form.guard(),
                self.form.feedback_slot(),
                self.auth.sign_up(&input),
            )
            .await
    }

    /// Follow the "already registered" link.
    pub fn open_login(&self) -> bool {
        self.context.navigate(Route::Login)
    }
}

/// Controller of the forgot-password screen.
pub struct ForgotPasswordScreen {
    context: ScreenContext,
    auth: Arc<dyn Authentication>,
    form: FormState<PasswordResetForm>,
}

impl ForgotPasswordScreen {
    /// Mount the screen with an empty form.
    pub fn new(context: ScreenContext, auth: Arc<dyn Authentication>) -> Self {
        Self {
            context,
            auth,
            form: FormState::new(PasswordResetForm::default()),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Form state.
    pub fn form(&self) -> &FormState<PasswordResetForm> {
        &self.form
    }

    /// Request the reset email, then return to the previous screen.
    pub async fn submit(&self) -> Outcome<()> {
        let input = self.form.input();
        let outcome = self
            .context
            .run(
                "send_password_reset",
                self.form.guard(),
                self.form.feedback_slot(),
                self.auth.send_password_reset(&input),
            )
            .await;
        if matches!(outcome, Outcome::Completed(())) {
            info!("password reset requested");
            self.context.go_back();
        }
        outcome
    }

    /// Return to the login screen.
    pub fn open_login(&self) -> bool {
        self.context.navigate(Route::Login)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
