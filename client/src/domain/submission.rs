//! Guard against submitting the same form twice.
//!
//! A form controller owns one [`SubmissionGuard`]. Starting a submission
//! takes the only [`SubmissionTicket`]; a second attempt while the ticket is
//! alive is refused, and dropping the ticket re-enables submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-form flag tracking an outstanding submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    busy: Arc<AtomicBool>,
}

impl SubmissionGuard {
    /// Take the ticket, or `None` while another submission is outstanding.
    pub fn try_begin(&self) -> Option<SubmissionTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    /// True while a ticket is alive.
    pub fn is_submitting(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of an outstanding submission; releases the guard on drop.
#[derive(Debug)]
pub struct SubmissionTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn second_submission_is_refused_until_ticket_drops() {
        let guard = SubmissionGuard::default();

        let ticket = guard.try_begin().expect("first submission");
        assert!(guard.is_submitting());
        assert!(guard.try_begin().is_none());

        drop(ticket);
        assert!(!guard.is_submitting());
        assert!(guard.try_begin().is_some());
    }

    #[rstest]
    fn clones_share_the_flag() {
        let guard = SubmissionGuard::default();
        let other = guard.clone();
        let _ticket = guard.try_begin().expect("ticket");
        assert!(other.try_begin().is_none());
    }
}
