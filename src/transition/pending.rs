//! Handles for transitions awaiting confirmation.

use crate::core::{Action, Location};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Final state of a transition that went through confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Approved,
    Rejected,
    /// Cancelled before an answer arrived, either explicitly or because a
    /// newer transition superseded it. The commit callback never ran.
    Cancelled,
}

type Callback = Box<dyn FnOnce(bool) + Send>;

enum Slot {
    Pending(Callback),
    Settled(TransitionOutcome),
}

struct PendingInner {
    location: Location,
    action: Action,
    slot: Mutex<Slot>,
}

/// A transition that has been proposed and may still be waiting for an
/// answer.
///
/// The commit callback runs at most once, when the transition is resolved.
/// Guards without a message resolve synchronously, so the handle returned
/// from such a call is already settled. Message prompts resolve whenever the
/// [`UserConfirmation`] answers, which may be on a later turn.
#[derive(Clone)]
pub struct PendingTransition {
    inner: Arc<PendingInner>,
}

impl PendingTransition {
    pub(crate) fn new(location: Location, action: Action, callback: Callback) -> Self {
        Self {
            inner: Arc::new(PendingInner {
                location,
                action,
                slot: Mutex::new(Slot::Pending(callback)),
            }),
        }
    }

    /// The candidate location.
    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    pub fn action(&self) -> Action {
        self.inner.action
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.inner.slot.lock(), Slot::Pending(_))
    }

    /// `None` while still waiting.
    pub fn outcome(&self) -> Option<TransitionOutcome> {
        match &*self.inner.slot.lock() {
            Slot::Pending(_) => None,
            Slot::Settled(outcome) => Some(*outcome),
        }
    }

    /// Cancel the transition if it has not been answered yet. Returns whether
    /// anything was cancelled; a later answer is ignored.
    pub fn cancel(&self) -> bool {
        self.settle(TransitionOutcome::Cancelled).is_some()
    }

    pub(crate) fn resolve(&self, approved: bool) {
        let outcome = if approved {
            TransitionOutcome::Approved
        } else {
            TransitionOutcome::Rejected
        };

        // The callback runs with the slot unlocked so it may start another
        // transition.
        if let Some(callback) = self.settle(outcome) {
            callback(approved);
        }
    }

    fn settle(&self, outcome: TransitionOutcome) -> Option<Callback> {
        let mut slot = self.inner.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Settled(outcome)) {
            Slot::Pending(callback) => Some(callback),
            settled => {
                *slot = settled;
                None
            }
        }
    }
}

impl fmt::Debug for PendingTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransition")
            .field("path", &self.inner.location.path())
            .field("action", &self.inner.action)
            .field("outcome", &self.outcome())
            .finish()
    }
}

/// One-shot answer channel handed to a [`UserConfirmation`].
///
/// Answering consumes the responder. A responder dropped without an answer
/// rejects the transition, so every confirmation ends in exactly one answer.
pub struct Responder {
    pending: Option<PendingTransition>,
}

impl Responder {
    pub(crate) fn new(pending: PendingTransition) -> Self {
        Self {
            pending: Some(pending),
        }
    }

    pub fn respond(mut self, approved: bool) {
        if let Some(pending) = self.pending.take() {
            pending.resolve(approved);
        }
    }

    /// True once the transition was superseded or cancelled; answering is
    /// then a no-op.
    pub fn is_cancelled(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.outcome() == Some(TransitionOutcome::Cancelled))
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending.is_pending() {
                tracing::debug!(
                    path = %pending.location().path(),
                    "confirmation dropped without an answer; rejecting"
                );
                pending.resolve(false);
            }
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("pending", &self.pending)
            .finish()
    }
}

/// Interactive yes/no confirmation, usually asynchronous.
///
/// Implemented for any `Fn(&str, Responder)`.
pub trait UserConfirmation: Send + Sync {
    fn confirm(&self, message: &str, responder: Responder);
}

impl<F> UserConfirmation for F
where
    F: Fn(&str, Responder) + Send + Sync,
{
    fn confirm(&self, message: &str, responder: Responder) {
        self(message, responder)
    }
}
