//! Confirmation gate and listener fan-out shared by both history engines.

use crate::core::{Action, Location};
use crate::diagnostics::{Diagnostics, Warning};
use crate::transition::disposer::Disposer;
use crate::transition::pending::{PendingTransition, Responder, UserConfirmation};
use crate::transition::prompt::{Prompt, PromptOutcome};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Callback invoked after every committed (or re-announced) transition.
pub type Listener = dyn Fn(&Location, Action) + Send + Sync;

struct ListenerSlot {
    active: AtomicBool,
    callback: Box<Listener>,
}

/// Owns the single prompt and the listener registry of one history.
///
/// Every navigation passes through [`confirm_transition_to`] before it
/// commits, and every commit ends with [`notify_listeners`].
///
/// Only the most recent transition may still be waiting for an answer:
/// starting a new confirmation cancels an unresolved earlier one.
///
/// [`confirm_transition_to`]: TransitionManager::confirm_transition_to
/// [`notify_listeners`]: TransitionManager::notify_listeners
pub struct TransitionManager {
    prompt: Mutex<Option<Arc<Prompt>>>,
    listeners: Mutex<Vec<Arc<ListenerSlot>>>,
    in_flight: Mutex<Option<PendingTransition>>,
    diagnostics: Diagnostics,
}

impl TransitionManager {
    pub fn new(diagnostics: Diagnostics) -> Arc<Self> {
        Arc::new(Self {
            prompt: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            in_flight: Mutex::new(None),
            diagnostics,
        })
    }

    /// Install `prompt` as the active guard.
    ///
    /// Replacing a guard that is still installed is reported but allowed.
    /// The returned disposer only clears the prompt if it is still this one.
    pub fn set_prompt(self: &Arc<Self>, prompt: Prompt) -> Disposer {
        let prompt = Arc::new(prompt);
        let replaced = self.prompt.lock().replace(Arc::clone(&prompt)).is_some();
        if replaced {
            self.diagnostics.report(Warning::PromptAlreadySet);
        }

        let manager = Arc::downgrade(self);
        Disposer::new(move || clear_prompt(&manager, &prompt))
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.lock().is_some()
    }

    /// Ask whether the transition to `location` may proceed.
    ///
    /// `callback` receives the answer exactly once, unless the transition is
    /// cancelled first. Without a prompt, or when the prompt allows or
    /// blocks outright, the answer is given before this returns. A message
    /// prompt is forwarded to `confirmation`; with no confirmation
    /// configured the transition is approved and the misuse reported.
    pub fn confirm_transition_to<F>(
        &self,
        location: Location,
        action: Action,
        confirmation: Option<&Arc<dyn UserConfirmation>>,
        callback: F,
    ) -> PendingTransition
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let pending = PendingTransition::new(location, action, Box::new(callback));

        let previous = self.in_flight.lock().replace(pending.clone());
        if let Some(previous) = previous {
            if previous.cancel() {
                tracing::debug!(
                    superseded = %previous.location().path(),
                    by = %pending.location().path(),
                    "superseded unanswered transition"
                );
            }
        }

        let prompt = self.prompt.lock().clone();
        let Some(prompt) = prompt else {
            pending.resolve(true);
            return pending;
        };

        match prompt.evaluate(pending.location(), action) {
            PromptOutcome::Allow => pending.resolve(true),
            PromptOutcome::Block => {
                tracing::debug!(path = %pending.location().path(), %action, "transition blocked");
                pending.resolve(false);
            }
            PromptOutcome::Ask(message) => match confirmation {
                Some(confirmation) => {
                    confirmation.confirm(&message, Responder::new(pending.clone()));
                }
                None => {
                    self.diagnostics.report(Warning::MissingUserConfirmation);
                    pending.resolve(true);
                }
            },
        }

        pending
    }

    /// Register a listener; it stays active until the disposer runs.
    pub fn append_listener<F>(self: &Arc<Self>, listener: F) -> Disposer
    where
        F: Fn(&Location, Action) + Send + Sync + 'static,
    {
        let slot = Arc::new(ListenerSlot {
            active: AtomicBool::new(true),
            callback: Box::new(listener),
        });
        self.listeners.lock().push(Arc::clone(&slot));

        let manager = Arc::downgrade(self);
        Disposer::new(move || {
            slot.active.store(false, Ordering::SeqCst);
            if let Some(manager) = manager.upgrade() {
                manager
                    .listeners
                    .lock()
                    .retain(|other| !Arc::ptr_eq(other, &slot));
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Call every active listener in registration order.
    ///
    /// A listener removed during the pass is skipped from then on. A
    /// panicking listener is logged and the pass continues.
    pub fn notify_listeners(&self, location: &Location, action: Action) {
        let listeners: Vec<Arc<ListenerSlot>> = self.listeners.lock().clone();

        for slot in listeners {
            if !slot.active.load(Ordering::SeqCst) {
                continue;
            }

            let result = catch_unwind(AssertUnwindSafe(|| (slot.callback)(location, action)));
            if result.is_err() {
                tracing::error!(path = %location.path(), %action, "history listener panicked");
            }
        }
    }
}

fn clear_prompt(manager: &Weak<TransitionManager>, prompt: &Arc<Prompt>) {
    let Some(manager) = manager.upgrade() else {
        return;
    };

    let mut current = manager.prompt.lock();
    if current.as_ref().is_some_and(|p| Arc::ptr_eq(p, prompt)) {
        *current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn location(path: &str) -> Location {
        Location::from_descriptor(path.into(), None, None, None)
    }

    fn recorder() -> (Arc<Mutex<Vec<bool>>>, impl FnOnce(bool) + Send + 'static) {
        let answers = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&answers);
        (answers, move |ok| sink.lock().push(ok))
    }

    fn collecting() -> (Diagnostics, Arc<Mutex<Vec<Warning>>>) {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        (
            Diagnostics::with_sink(move |w: &Warning| sink.lock().push(w.clone())),
            warnings,
        )
    }

    #[test]
    fn no_prompt_approves_synchronously() {
        let manager = TransitionManager::new(Diagnostics::new());
        let (answers, callback) = recorder();

        let pending = manager.confirm_transition_to(location("/a"), Action::Push, None, callback);

        assert_eq!(*answers.lock(), vec![true]);
        assert!(!pending.is_pending());
    }

    #[test]
    fn blocking_guard_rejects() {
        let manager = TransitionManager::new(Diagnostics::new());
        let _unblock = manager.set_prompt(Prompt::guard(|_, _| PromptOutcome::Block));
        let (answers, callback) = recorder();

        manager.confirm_transition_to(location("/a"), Action::Push, None, callback);

        assert_eq!(*answers.lock(), vec![false]);
    }

    #[test]
    fn message_without_confirmation_approves_and_reports() {
        let (diagnostics, warnings) = collecting();
        let manager = TransitionManager::new(diagnostics);
        let _unblock = manager.set_prompt("Leave?".into());
        let (answers, callback) = recorder();

        manager.confirm_transition_to(location("/a"), Action::Push, None, callback);

        assert_eq!(*answers.lock(), vec![true]);
        assert_eq!(*warnings.lock(), vec![Warning::MissingUserConfirmation]);
    }

    #[test]
    fn message_is_forwarded_to_confirmation() {
        let manager = TransitionManager::new(Diagnostics::new());
        let _unblock = manager.set_prompt(Prompt::guard(|_, _| "Really?".into()));
        let asked = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&asked);
        let confirmation: Arc<dyn UserConfirmation> =
            Arc::new(move |message: &str, responder: Responder| {
                log.lock().push(message.to_string());
                responder.respond(false);
            });
        let (answers, callback) = recorder();

        manager.confirm_transition_to(location("/a"), Action::Pop, Some(&confirmation), callback);

        assert_eq!(*asked.lock(), vec!["Really?".to_string()]);
        assert_eq!(*answers.lock(), vec![false]);
    }

    #[test]
    fn deferred_answer_arrives_later() {
        let manager = TransitionManager::new(Diagnostics::new());
        let _unblock = manager.set_prompt("Leave?".into());
        let parked: Arc<Mutex<Option<Responder>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        let confirmation: Arc<dyn UserConfirmation> =
            Arc::new(move |_: &str, responder: Responder| {
                *slot.lock() = Some(responder);
            });
        let (answers, callback) = recorder();

        let pending =
            manager.confirm_transition_to(location("/a"), Action::Push, Some(&confirmation), callback);
        assert!(pending.is_pending());
        assert!(answers.lock().is_empty());

        let responder = parked.lock().take().unwrap();
        responder.respond(true);

        assert_eq!(*answers.lock(), vec![true]);
        assert!(!pending.is_pending());
    }

    #[test]
    fn newer_transition_supersedes_unanswered_one() {
        let manager = TransitionManager::new(Diagnostics::new());
        let _unblock = manager.set_prompt("Leave?".into());
        let parked: Arc<Mutex<Vec<Responder>>> = Arc::new(Mutex::new(Vec::new()));
        let slot = Arc::clone(&parked);
        let confirmation: Arc<dyn UserConfirmation> =
            Arc::new(move |_: &str, responder: Responder| slot.lock().push(responder));
        let (first_answers, first) = recorder();
        let (second_answers, second) = recorder();

        let older =
            manager.confirm_transition_to(location("/a"), Action::Push, Some(&confirmation), first);
        let newer =
            manager.confirm_transition_to(location("/b"), Action::Push, Some(&confirmation), second);

        let responders: Vec<Responder> = parked.lock().drain(..).collect();
        for responder in responders {
            responder.respond(true);
        }

        assert!(first_answers.lock().is_empty());
        assert_eq!(*second_answers.lock(), vec![true]);
        assert_eq!(older.outcome(), Some(crate::transition::TransitionOutcome::Cancelled));
        assert_eq!(newer.outcome(), Some(crate::transition::TransitionOutcome::Approved));
    }

    #[test]
    fn second_prompt_is_reported_but_installed() {
        let (diagnostics, warnings) = collecting();
        let manager = TransitionManager::new(diagnostics);

        let first = manager.set_prompt(Prompt::Deny);
        let _second = manager.set_prompt(Prompt::guard(|_, _| PromptOutcome::Allow));
        assert_eq!(*warnings.lock(), vec![Warning::PromptAlreadySet]);

        // The stale disposer must not clear the newer prompt.
        first.dispose();
        assert!(manager.has_prompt());

        let (answers, callback) = recorder();
        manager.confirm_transition_to(location("/a"), Action::Push, None, callback);
        assert_eq!(*answers.lock(), vec![true]);
    }

    #[test]
    fn unblock_clears_own_prompt() {
        let manager = TransitionManager::new(Diagnostics::new());
        let unblock = manager.set_prompt(Prompt::Deny);

        unblock.dispose();
        unblock.dispose();

        assert!(!manager.has_prompt());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let manager = TransitionManager::new(Diagnostics::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = Arc::clone(&order);
            let _ = manager.append_listener(move |_, _| order.lock().push(id));
        }

        manager.notify_listeners(&location("/a"), Action::Push);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn listener_removed_mid_pass_is_skipped() {
        let manager = TransitionManager::new(Diagnostics::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let second: Arc<Mutex<Option<Disposer>>> = Arc::new(Mutex::new(None));

        let remover = Arc::clone(&second);
        let _first = manager.append_listener(move |_, _| {
            if let Some(disposer) = remover.lock().as_ref() {
                disposer.dispose();
            }
        });
        let counter = Arc::clone(&calls);
        let disposer = manager.append_listener(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        *second.lock() = Some(disposer);

        manager.notify_listeners(&location("/a"), Action::Push);
        manager.notify_listeners(&location("/b"), Action::Push);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.listener_count(), 1);
    }

    #[test]
    fn panicking_listener_does_not_stop_others() {
        let manager = TransitionManager::new(Diagnostics::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let _bad = manager.append_listener(|_, _| panic!("listener failure"));
        let counter = Arc::clone(&calls);
        let _good = manager.append_listener(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.notify_listeners(&location("/a"), Action::Push);
        manager.notify_listeners(&location("/b"), Action::Push);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unlisten_is_idempotent() {
        let manager = TransitionManager::new(Diagnostics::new());
        let keep = manager.append_listener(|_, _| {});
        let unlisten = manager.append_listener(|_, _| {});

        unlisten.dispose();
        unlisten.dispose();

        assert_eq!(manager.listener_count(), 1);
        assert!(!keep.is_disposed());
    }
}
