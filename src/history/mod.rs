//! History engines.
//!
//! Both engines expose the same [`History`] contract and route every
//! navigation through a [`TransitionManager`](crate::transition::TransitionManager):
//!
//! - [`MemoryHistory`] owns its whole entry stack; use it where the host has
//!   no addressable history, and for deterministic tests.
//! - [`BrowserHistory`] writes through to a host-owned
//!   [`NavigationStack`](crate::platform::NavigationStack) and keeps a lossy
//!   [`KeyShadow`] of that stack to undo pops a prompt rejected.

mod bridge;
mod browser;
mod keys;
mod memory;

pub use browser::{BrowserHistory, NextPop};
pub use keys::KeyShadow;
pub use memory::MemoryHistory;

use crate::core::{Action, Location, LocationDescriptor};
use crate::diagnostics::{Diagnostics, Warning};
use crate::transition::{Disposer, PendingTransition, Prompt};
use serde_json::Value;

/// The navigation surface shared by every engine.
///
/// # Example
///
/// ```rust
/// use navstack::core::Action;
/// use navstack::history::{History, MemoryHistory};
///
/// let history = MemoryHistory::new();
/// history.push("/inbox", None);
///
/// assert_eq!(history.location().pathname, "/inbox");
/// assert_eq!(history.action(), Action::Push);
/// assert_eq!(history.length(), 2);
/// ```
pub trait History: Send + Sync {
    /// The current location.
    fn location(&self) -> Location;

    /// How the current location was reached.
    fn action(&self) -> Action;

    /// Number of entries in the stack, as far as this engine knows.
    fn length(&self) -> usize;

    /// Render `location` as an href for this history.
    fn create_href(&self, location: &Location) -> String;

    /// Propose a new entry after the current one.
    ///
    /// `state` is ignored (and the misuse reported) when `path` is a partial
    /// location that already carries state.
    fn push<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>;

    /// Propose overwriting the current entry.
    fn replace<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>;

    /// Move by `n` entries.
    fn go(&self, n: isize);

    fn go_back(&self) {
        self.go(-1);
    }

    fn go_forward(&self) {
        self.go(1);
    }

    /// Install `prompt` as the guard for every following transition.
    fn block(&self, prompt: Prompt) -> Disposer;

    /// Observe committed transitions.
    fn listen<F>(&self, listener: F) -> Disposer
    where
        F: Fn(&Location, Action) + Send + Sync + 'static;
}

pub(crate) fn warn_redundant_state(
    diagnostics: &Diagnostics,
    path: &LocationDescriptor,
    state: &Option<Value>,
    action: Action,
) {
    if path.state().is_some() && state.is_some() {
        diagnostics.report(Warning::RedundantState { action });
    }
}
