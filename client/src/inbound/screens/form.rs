//! Editable form state shared by the form screens.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::SubmissionGuard;

use super::context::Feedback;

/// Raw input, feedback, and submission flag of one form.
///
/// Input and feedback sit behind short-lived locks so a controller can be
/// shared by reference while a submission is outstanding.
#[derive(Debug, Default)]
pub struct FormState<F> {
    input: Mutex<F>,
    feedback: Mutex<Feedback>,
    guard: SubmissionGuard,
}

impl<F: Clone> FormState<F> {
    /// Start from `input`.
    pub fn new(input: F) -> Self {
        Self {
            input: Mutex::new(input),
            feedback: Mutex::new(Feedback::default()),
            guard: SubmissionGuard::default(),
        }
    }

    /// Copy of the current input.
    pub fn input(&self) -> F {
        lock(&self.input).clone()
    }

    /// Change the input in place.
    pub fn edit(&self, change: impl FnOnce(&mut F)) {
        change(&mut lock(&self.input));
    }

    /// Replace the whole input.
    pub fn replace(&self, input: F) {
        *lock(&self.input) = input;
    }

    /// Copy of the current feedback.
    pub fn feedback(&self) -> Feedback {
        lock(&self.feedback).clone()
    }

    /// Hide the notice, keeping field errors.
    pub fn dismiss_notice(&self) {
        lock(&self.feedback).notice = None;
    }

    /// Set a notice outside of a submission.
    pub fn notify(&self, notice: impl Into<String>) {
        lock(&self.feedback).notice = Some(notice.into());
    }

    /// True while a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub(crate) fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    pub(crate) fn feedback_slot(&self) -> &Mutex<Feedback> {
        &self.feedback
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
