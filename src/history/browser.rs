//! Platform-backed history layered over a host-owned navigation stack.

use super::bridge::ListenerBridge;
use super::keys::KeyShadow;
use super::{warn_redundant_state, History};
use crate::builder::{BrowserHistoryBuilder, BuildError};
use crate::core::path::{create_path, has_basename, normalize_basename, strip_basename};
use crate::core::{Action, KeyGenerator, Location, LocationDescriptor};
use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::{
    EntryState, NavigationStack, PlatformConfirmation, PopChannel, PopEvent, PopHandler,
};
use crate::transition::{
    Disposer, PendingTransition, Prompt, TransitionManager, UserConfirmation,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

/// How the engine will treat the next pop notification from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NextPop {
    /// A user or caller moved the stack: confirm it as a transition.
    #[default]
    Transition,
    /// The engine itself moved the stack back after a rejected pop: just
    /// resynchronize and re-announce the current location.
    Resync,
}

struct BrowserState {
    action: Action,
    location: Location,
    length: usize,
    keys: KeyShadow,
    next_pop: NextPop,
    blocked: bool,
}

struct BrowserInner {
    stack: Arc<dyn NavigationStack>,
    supports_history: bool,
    basename: String,
    force_refresh: bool,
    keys: KeyGenerator,
    confirmation: Option<Arc<dyn UserConfirmation>>,
    diagnostics: Diagnostics,
    transitions: Arc<TransitionManager>,
    bridge: ListenerBridge,
    state: Mutex<BrowserState>,
}

/// A history that writes through to a host navigation stack.
///
/// The host owns the real stack and may move it at any time (the user
/// presses Back twice). Pops arrive through the host's notification
/// channels, which this history subscribes to only while someone listens or
/// blocks. A pop the prompt rejects is undone by moving the host back by an
/// offset computed from a [`KeyShadow`]; the pop caused by that correction is
/// not confirmed again.
///
/// # Example
///
/// ```rust
/// use navstack::history::{BrowserHistory, History};
/// use navstack::platform::SimulatedStack;
/// use std::sync::Arc;
///
/// let stack = Arc::new(SimulatedStack::new("/app/home"));
/// let history = BrowserHistory::builder(stack.clone())
///     .basename("/app")
///     .build()
///     .unwrap();
///
/// assert_eq!(history.location().pathname, "/home");
///
/// history.push("/settings", None);
/// assert_eq!(stack.hrefs(), vec!["/app/home", "/app/settings"]);
/// ```
#[derive(Clone)]
pub struct BrowserHistory {
    inner: Arc<BrowserInner>,
}

impl BrowserHistory {
    pub fn builder(stack: Arc<dyn NavigationStack>) -> BrowserHistoryBuilder {
        BrowserHistoryBuilder::new(stack)
    }

    pub(crate) fn assemble(
        stack: Arc<dyn NavigationStack>,
        basename: &str,
        force_refresh: bool,
        keys: KeyGenerator,
        confirmation: Option<Arc<dyn UserConfirmation>>,
        diagnostics: Diagnostics,
    ) -> Result<Self, BuildError> {
        let capabilities = stack.capabilities();
        if !capabilities.has_document {
            return Err(BuildError::MissingDocument);
        }

        let basename = normalize_basename(basename);
        let confirmation = confirmation.unwrap_or_else(|| {
            Arc::new(PlatformConfirmation::new(Arc::clone(&stack))) as Arc<dyn UserConfirmation>
        });
        let location = platform_location(
            stack.as_ref(),
            &basename,
            stack.current_entry(),
            &diagnostics,
        );
        let length = stack.length();

        let inner = Arc::new_cyclic(|weak: &Weak<BrowserInner>| BrowserInner {
            bridge: ListenerBridge::new(Arc::clone(&stack), pop_handler(weak.clone())),
            transitions: TransitionManager::new(diagnostics.clone()),
            supports_history: capabilities.supports_history,
            state: Mutex::new(BrowserState {
                action: Action::Pop,
                keys: KeyShadow::seeded(location.key.clone()),
                location,
                length,
                next_pop: NextPop::Transition,
                blocked: false,
            }),
            stack,
            basename,
            force_refresh,
            keys,
            confirmation: Some(confirmation),
            diagnostics,
        });

        tracing::debug!(basename = %inner.basename, "browser history attached");
        Ok(Self { inner })
    }

    pub fn basename(&self) -> &str {
        &self.inner.basename
    }

    /// How the next host pop will be handled.
    pub fn next_pop(&self) -> NextPop {
        self.inner.state.lock().next_pop
    }

    /// The engine's current view of the host stack's key order.
    pub fn shadow_keys(&self) -> Vec<Option<String>> {
        self.inner.state.lock().keys.keys().to_vec()
    }

    /// Whether the host pop handler is currently attached.
    pub fn is_subscribed(&self) -> bool {
        self.inner.bridge.is_attached()
    }

    fn candidate(&self, path: LocationDescriptor, state: Option<Value>) -> Location {
        let current = self.inner.state.lock().location.clone();
        Location::from_descriptor(path, state, Some(self.inner.keys.generate()), Some(&current))
    }

    fn propose<F>(&self, location: Location, action: Action, commit: F) -> PendingTransition
    where
        F: FnOnce(&BrowserInner, Location) + Send + 'static,
    {
        let inner = Arc::downgrade(&self.inner);
        let next = location.clone();
        self.inner.transitions.confirm_transition_to(
            location,
            action,
            self.inner.confirmation.as_ref(),
            move |ok| {
                if !ok {
                    return;
                }
                if let Some(inner) = inner.upgrade() {
                    commit(&*inner, next);
                }
            },
        )
    }
}

impl fmt::Debug for BrowserHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("BrowserHistory")
            .field("basename", &self.inner.basename)
            .field("action", &state.action)
            .field("location", &state.location)
            .field("length", &state.length)
            .finish_non_exhaustive()
    }
}

/// Read the host's current entry as a location, basename stripped.
fn platform_location(
    stack: &dyn NavigationStack,
    basename: &str,
    entry: Option<EntryState>,
    diagnostics: &Diagnostics,
) -> Location {
    let EntryState { key, state } = entry.unwrap_or_default();
    let mut path = stack.current_path();

    if !basename.is_empty() {
        if has_basename(&path, basename) {
            path = strip_basename(&path, basename).to_string();
        } else {
            diagnostics.report(Warning::BasenameMismatch {
                path: path.clone(),
                basename: basename.to_string(),
            });
        }
    }

    Location::from_descriptor(path.into(), state, key, None)
}

fn pop_handler(inner: Weak<BrowserInner>) -> PopHandler {
    Arc::new(move |event: &PopEvent| {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if event.extraneous {
            tracing::trace!("ignoring extraneous pop event");
            return;
        }

        let entry = match event.channel {
            PopChannel::Primary => event.entry.clone(),
            PopChannel::Fallback => inner.stack.current_entry(),
        };
        let location = platform_location(
            inner.stack.as_ref(),
            &inner.basename,
            entry,
            &inner.diagnostics,
        );
        inner.handle_pop(location);
    })
}

impl BrowserInner {
    /// Apply `update`, refresh the host length, then announce the resulting
    /// location to listeners.
    fn set_state(&self, update: impl FnOnce(&mut BrowserState)) {
        let length = self.stack.length();
        let (location, action) = {
            let mut state = self.state.lock();
            update(&mut state);
            state.length = length;
            (state.location.clone(), state.action)
        };

        tracing::debug!(%action, path = %location.path(), length, "browser history updated");
        self.transitions.notify_listeners(&location, action);
    }

    fn handle_pop(self: &Arc<Self>, location: Location) {
        let expectation = std::mem::take(&mut self.state.lock().next_pop);

        match expectation {
            NextPop::Resync => {
                tracing::debug!(path = %location.path(), "resynchronized after reverted pop");
                self.set_state(|_| {});
            }
            NextPop::Transition => {
                let inner = Arc::downgrade(self);
                let candidate = location.clone();
                self.transitions.confirm_transition_to(
                    location,
                    Action::Pop,
                    self.confirmation.as_ref(),
                    move |ok| {
                        let Some(inner) = inner.upgrade() else {
                            return;
                        };
                        if ok {
                            inner.set_state(|state| {
                                state.action = Action::Pop;
                                state.location = candidate;
                            });
                        } else {
                            inner.revert_pop(&candidate);
                        }
                    },
                );
            }
        }
    }

    /// Move the host back to where it was before the rejected pop to `from`.
    fn revert_pop(&self, from: &Location) {
        let delta = {
            let mut state = self.state.lock();
            let delta = state
                .keys
                .revert_delta(state.location.key.as_deref(), from.key.as_deref());
            if delta != 0 {
                state.next_pop = NextPop::Resync;
            }
            delta
        };

        if delta == 0 {
            tracing::debug!(path = %from.path(), "rejected pop has no known offset to revert");
            return;
        }

        tracing::debug!(delta, path = %from.path(), "reverting rejected pop");
        self.stack.go(delta);
    }

    fn href(&self, location: &Location) -> String {
        format!(
            "{}{}",
            self.basename,
            create_path(&location.pathname, &location.search, &location.hash)
        )
    }

    fn commit_push(&self, location: Location) {
        let href = self.href(&location);

        if !self.supports_history {
            if location.state.is_some() {
                self.diagnostics.report(Warning::HistoryApiUnsupported {
                    action: Action::Push,
                });
            }
            self.stack.assign(&href);
            return;
        }

        self.stack.push_entry(entry_state(&location), &href);

        if self.force_refresh {
            self.stack.assign(&href);
            return;
        }

        self.set_state(|state| {
            let current = state.location.key.clone();
            state
                .keys
                .record_push(current.as_deref(), location.key.clone());
            state.action = Action::Push;
            state.location = location;
        });
    }

    fn commit_replace(&self, location: Location) {
        let href = self.href(&location);

        if !self.supports_history {
            if location.state.is_some() {
                self.diagnostics.report(Warning::HistoryApiUnsupported {
                    action: Action::Replace,
                });
            }
            self.stack.replace_document(&href);
            return;
        }

        self.stack.replace_entry(entry_state(&location), &href);

        if self.force_refresh {
            self.stack.replace_document(&href);
            return;
        }

        self.set_state(|state| {
            let current = state.location.key.clone();
            state
                .keys
                .record_replace(current.as_deref(), location.key.clone());
            state.action = Action::Replace;
            state.location = location;
        });
    }
}

fn entry_state(location: &Location) -> EntryState {
    EntryState {
        key: location.key.clone(),
        state: location.state.clone(),
    }
}

impl History for BrowserHistory {
    fn location(&self) -> Location {
        self.inner.state.lock().location.clone()
    }

    fn action(&self) -> Action {
        self.inner.state.lock().action
    }

    fn length(&self) -> usize {
        self.inner.state.lock().length
    }

    fn create_href(&self, location: &Location) -> String {
        self.inner.href(location)
    }

    fn push<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>,
    {
        let path = path.into();
        warn_redundant_state(&self.inner.diagnostics, &path, &state, Action::Push);
        let location = self.candidate(path, state);
        self.propose(location, Action::Push, |inner, next| inner.commit_push(next))
    }

    fn replace<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>,
    {
        let path = path.into();
        warn_redundant_state(&self.inner.diagnostics, &path, &state, Action::Replace);
        let location = self.candidate(path, state);
        self.propose(location, Action::Replace, |inner, next| {
            inner.commit_replace(next)
        })
    }

    /// Ask the host to move; the resulting pop is confirmed when the host
    /// announces it.
    fn go(&self, n: isize) {
        self.inner.stack.go(n);
    }

    fn block(&self, prompt: Prompt) -> Disposer {
        let unblock = self.inner.transitions.set_prompt(prompt);

        let newly_blocked = !std::mem::replace(&mut self.inner.state.lock().blocked, true);
        if newly_blocked {
            self.inner.bridge.retain();
        }

        let inner = Arc::downgrade(&self.inner);
        Disposer::new(move || {
            if let Some(inner) = inner.upgrade() {
                let was_blocked = std::mem::replace(&mut inner.state.lock().blocked, false);
                if was_blocked {
                    inner.bridge.release();
                }
            }
            unblock.dispose();
        })
    }

    fn listen<F>(&self, listener: F) -> Disposer
    where
        F: Fn(&Location, Action) + Send + Sync + 'static,
    {
        let unlisten = self.inner.transitions.append_listener(listener);
        self.inner.bridge.retain();

        let inner = Arc::downgrade(&self.inner);
        Disposer::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.bridge.release();
            }
            unlisten.dispose();
        })
    }
}
