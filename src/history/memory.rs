//! Self-hosted history that owns its whole entry stack.

use super::{warn_redundant_state, History};
use crate::builder::MemoryHistoryBuilder;
use crate::core::path::create_path;
use crate::core::{Action, KeyGenerator, Location, LocationDescriptor};
use crate::diagnostics::Diagnostics;
use crate::transition::{
    Disposer, PendingTransition, Prompt, TransitionManager, UserConfirmation,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};

struct MemoryState {
    action: Action,
    location: Location,
    index: usize,
    entries: Vec<Location>,
}

struct MemoryInner {
    transitions: Arc<TransitionManager>,
    confirmation: Option<Arc<dyn UserConfirmation>>,
    keys: KeyGenerator,
    diagnostics: Diagnostics,
    state: Mutex<MemoryState>,
}

/// A history kept entirely in memory.
///
/// Used where the host has no addressable history of its own, and for
/// tests. Entries, cursor and listeners live in this process; `go` runs
/// through the prompt like any other transition.
///
/// # Example
///
/// ```rust
/// use navstack::core::Action;
/// use navstack::history::{History, MemoryHistory};
///
/// let history = MemoryHistory::builder()
///     .initial_entries(["/a", "/b", "/c"])
///     .initial_index(1)
///     .build();
///
/// history.go_back();
/// assert_eq!(history.index(), 0);
/// assert_eq!(history.location().pathname, "/a");
/// assert_eq!(history.action(), Action::Pop);
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<MemoryInner>,
}

impl MemoryHistory {
    /// A history holding a single `/` entry.
    pub fn new() -> Self {
        MemoryHistoryBuilder::new().build()
    }

    pub fn builder() -> MemoryHistoryBuilder {
        MemoryHistoryBuilder::new()
    }

    pub(crate) fn assemble(
        initial_entries: Vec<LocationDescriptor>,
        initial_index: usize,
        keys: KeyGenerator,
        confirmation: Option<Arc<dyn UserConfirmation>>,
        diagnostics: Diagnostics,
    ) -> Self {
        let mut entries: Vec<Location> = initial_entries
            .into_iter()
            .map(|entry| {
                let key = entry.key().map_or_else(|| keys.generate(), str::to_string);
                Location::from_descriptor(entry, None, Some(key), None)
            })
            .collect();

        if entries.is_empty() {
            entries.push(Location::from_descriptor(
                "/".into(),
                None,
                Some(keys.generate()),
                None,
            ));
        }

        let index = initial_index.min(entries.len() - 1);
        let location = entries[index].clone();

        Self {
            inner: Arc::new(MemoryInner {
                transitions: TransitionManager::new(diagnostics.clone()),
                confirmation,
                keys,
                diagnostics,
                state: Mutex::new(MemoryState {
                    action: Action::Pop,
                    location,
                    index,
                    entries,
                }),
            }),
        }
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.inner.state.lock().index
    }

    pub fn entries(&self) -> Vec<Location> {
        self.inner.state.lock().entries.clone()
    }

    /// Whether `go(n)` would land on an existing entry. `can_go(0)` is
    /// always true even though `go(0)` leaves the index where it is.
    pub fn can_go(&self, n: isize) -> bool {
        let state = self.inner.state.lock();
        let next = (state.index as isize).saturating_add(n);
        next >= 0 && next < state.entries.len() as isize
    }

    fn candidate(&self, path: LocationDescriptor, state: Option<Value>) -> Location {
        let current = self.inner.state.lock().location.clone();
        Location::from_descriptor(path, state, Some(self.inner.keys.generate()), Some(&current))
    }

    fn propose<F>(&self, location: Location, action: Action, commit: F) -> PendingTransition
    where
        F: FnOnce(&MemoryInner, bool) + Send + 'static,
    {
        let inner = Arc::downgrade(&self.inner);
        self.inner.transitions.confirm_transition_to(
            location,
            action,
            self.inner.confirmation.as_ref(),
            move |ok| with_inner(&inner, |inner| commit(inner, ok)),
        )
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("MemoryHistory")
            .field("action", &state.action)
            .field("index", &state.index)
            .field("entries", &state.entries)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn with_inner(inner: &Weak<MemoryInner>, f: impl FnOnce(&MemoryInner)) {
    if let Some(inner) = inner.upgrade() {
        f(&*inner);
    }
}

impl MemoryInner {
    /// Apply `update`, then announce the resulting location to listeners.
    fn set_state(&self, update: impl FnOnce(&mut MemoryState)) {
        let (location, action) = {
            let mut state = self.state.lock();
            update(&mut state);
            (state.location.clone(), state.action)
        };

        tracing::debug!(%action, path = %location.path(), "memory history updated");
        self.transitions.notify_listeners(&location, action);
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.inner.state.lock().location.clone()
    }

    fn action(&self) -> Action {
        self.inner.state.lock().action
    }

    fn length(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    fn create_href(&self, location: &Location) -> String {
        create_path(&location.pathname, &location.search, &location.hash)
    }

    fn push<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>,
    {
        let path = path.into();
        warn_redundant_state(&self.inner.diagnostics, &path, &state, Action::Push);
        let location = self.candidate(path, state);

        let next = location.clone();
        self.propose(location, Action::Push, move |inner, ok| {
            if !ok {
                return;
            }
            inner.set_state(|state| {
                let index = state.index + 1;
                state.entries.truncate(index);
                state.entries.push(next.clone());
                state.index = index;
                state.action = Action::Push;
                state.location = next;
            });
        })
    }

    fn replace<P>(&self, path: P, state: Option<Value>) -> PendingTransition
    where
        P: Into<LocationDescriptor>,
    {
        let path = path.into();
        warn_redundant_state(&self.inner.diagnostics, &path, &state, Action::Replace);
        let location = self.candidate(path, state);

        let next = location.clone();
        self.propose(location, Action::Replace, move |inner, ok| {
            if !ok {
                return;
            }
            inner.set_state(|state| {
                let index = state.index;
                state.entries[index] = next.clone();
                state.action = Action::Replace;
                state.location = next;
            });
        })
    }

    fn go(&self, n: isize) {
        let (target, location) = {
            let state = self.inner.state.lock();
            let last = state.entries.len() as isize - 1;
            let target = (state.index as isize).saturating_add(n).clamp(0, last) as usize;
            (target, state.entries[target].clone())
        };

        let next = location.clone();
        self.propose(location, Action::Pop, move |inner, ok| {
            if ok {
                inner.set_state(|state| {
                    state.index = target.min(state.entries.len() - 1);
                    state.action = Action::Pop;
                    state.location = next;
                });
            } else {
                // A rejected pop still re-announces the unchanged location.
                inner.set_state(|_| {});
            }
        });
    }

    fn block(&self, prompt: Prompt) -> Disposer {
        self.inner.transitions.set_prompt(prompt)
    }

    fn listen<F>(&self, listener: F) -> Disposer
    where
        F: Fn(&Location, Action) + Send + Sync + 'static,
    {
        self.inner.transitions.append_listener(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PartialLocation;
    use crate::diagnostics::Warning;
    use crate::transition::{PromptOutcome, Responder, TransitionOutcome};
    use serde_json::json;

    type Seen = Arc<Mutex<Vec<(String, Action)>>>;

    fn record(history: &MemoryHistory) -> (Seen, Disposer) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let unlisten = history.listen(move |location: &Location, action| {
            sink.lock().push((location.pathname.clone(), action));
        });
        (seen, unlisten)
    }

    fn abc() -> MemoryHistory {
        MemoryHistory::builder()
            .initial_entries(["/a", "/b", "/c"])
            .initial_index(1)
            .build()
    }

    fn pathnames(history: &MemoryHistory) -> Vec<String> {
        history.entries().into_iter().map(|l| l.pathname).collect()
    }

    #[test]
    fn default_history_has_root_entry() {
        let history = MemoryHistory::new();

        assert_eq!(history.location().pathname, "/");
        assert_eq!(history.action(), Action::Pop);
        assert_eq!(history.length(), 1);
        assert_eq!(history.index(), 0);
        assert!(history.location().key.is_some());
    }

    #[test]
    fn initial_index_selects_entry() {
        let history = abc();

        assert_eq!(history.location().pathname, "/b");
        assert_eq!(history.index(), 1);
        assert_eq!(history.length(), 3);
    }

    #[test]
    fn initial_index_is_clamped() {
        let history = MemoryHistory::builder()
            .initial_entries(["/a", "/b"])
            .initial_index(9)
            .build();

        assert_eq!(history.index(), 1);
        assert_eq!(history.location().pathname, "/b");
    }

    #[test]
    fn empty_initial_entries_fall_back_to_root() {
        let history = MemoryHistory::builder()
            .initial_entries(Vec::<String>::new())
            .build();

        assert_eq!(history.length(), 1);
        assert_eq!(history.location().pathname, "/");
    }

    #[test]
    fn initial_entry_keys_are_kept() {
        let history = MemoryHistory::builder()
            .initial_entry(PartialLocation::new().pathname("/kept").key("fixed"))
            .initial_entry("/fresh")
            .build();

        let entries = history.entries();
        assert_eq!(entries[0].key.as_deref(), Some("fixed"));
        assert!(entries[1].key.is_some());
        assert_ne!(entries[1].key.as_deref(), Some("fixed"));
    }

    #[test]
    fn go_back_moves_cursor() {
        let history = abc();
        let (seen, _unlisten) = record(&history);

        history.go_back();

        assert_eq!(history.index(), 0);
        assert_eq!(history.location().pathname, "/a");
        assert_eq!(history.action(), Action::Pop);
        assert_eq!(*seen.lock(), vec![("/a".to_string(), Action::Pop)]);
    }

    #[test]
    fn push_truncates_forward_entries() {
        let history = abc();
        let (seen, _unlisten) = record(&history);

        history.push("/x", Some(json!({ "from": "test" })));

        assert_eq!(pathnames(&history), vec!["/a", "/x"]);
        assert_eq!(history.index(), 1);
        assert_eq!(history.length(), 2);
        assert_eq!(history.action(), Action::Push);
        assert_eq!(history.location().state, Some(json!({ "from": "test" })));
        assert_eq!(*seen.lock(), vec![("/x".to_string(), Action::Push)]);
    }

    #[test]
    fn push_assigns_fresh_keys() {
        let history = MemoryHistory::new();
        history.push("/same", None);
        history.push("/same", None);

        let entries = history.entries();
        assert!(entries[1].same_content(&entries[2]));
        assert_ne!(entries[1].key, entries[2].key);
    }

    #[test]
    fn push_resolves_relative_paths() {
        let history = MemoryHistory::builder()
            .initial_entries(["/users/1"])
            .build();

        history.push("2", None);
        assert_eq!(history.location().pathname, "/users/2");

        history.push(PartialLocation::new().search("tab=info"), None);
        assert_eq!(history.location().pathname, "/users/2");
        assert_eq!(history.location().search, "?tab=info");
    }

    #[test]
    fn replace_keeps_length_and_index() {
        let history = abc();
        let (seen, _unlisten) = record(&history);

        history.replace("/z", None);

        assert_eq!(pathnames(&history), vec!["/a", "/z", "/c"]);
        assert_eq!(history.index(), 1);
        assert_eq!(history.length(), 3);
        assert_eq!(history.action(), Action::Replace);
        assert_eq!(*seen.lock(), vec![("/z".to_string(), Action::Replace)]);
    }

    #[test]
    fn go_saturates_at_bounds() {
        let history = abc();

        history.go(10);
        assert_eq!(history.index(), 2);

        history.go(-10);
        assert_eq!(history.index(), 0);

        history.go_back();
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn go_saturates_on_extreme_offsets() {
        let history = abc();

        history.go(isize::MAX);
        assert_eq!(history.index(), 2);
        assert_eq!(history.location().pathname, "/c");

        history.go(isize::MIN);
        assert_eq!(history.index(), 0);
        assert_eq!(history.location().pathname, "/a");
    }

    #[test]
    fn can_go_rejects_extreme_offsets() {
        let history = abc();

        assert!(!history.can_go(isize::MAX));
        assert!(!history.can_go(isize::MIN));
        assert!(history.can_go(0));
    }

    #[test]
    fn can_go_checks_bounds() {
        let history = abc();

        assert!(history.can_go(1));
        assert!(history.can_go(-1));
        assert!(!history.can_go(2));
        assert!(!history.can_go(-2));

        history.go_forward();
        assert!(!history.can_go(1));
    }

    #[test]
    fn blocked_push_changes_nothing() {
        let history = abc();
        let (seen, _unlisten) = record(&history);
        let _unblock = history.block(Prompt::guard(|_, _| PromptOutcome::Block));

        let pending = history.push("/x", None);

        assert_eq!(pending.outcome(), Some(TransitionOutcome::Rejected));
        assert_eq!(history.length(), 3);
        assert_eq!(history.location().pathname, "/b");
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn blocked_go_reannounces_current_location() {
        let history = abc();
        let (seen, _unlisten) = record(&history);
        let _unblock = history.block(Prompt::Deny);

        history.go_back();

        assert_eq!(history.index(), 1);
        assert_eq!(history.location().pathname, "/b");
        assert_eq!(history.action(), Action::Pop);
        assert_eq!(*seen.lock(), vec![("/b".to_string(), Action::Pop)]);
    }

    #[test]
    fn unblock_restores_navigation() {
        let history = abc();
        let unblock = history.block(Prompt::Deny);

        history.push("/x", None);
        assert_eq!(history.location().pathname, "/b");

        unblock.dispose();
        unblock.dispose();
        history.push("/x", None);
        assert_eq!(history.location().pathname, "/x");
    }

    #[test]
    fn message_prompt_without_confirmation_proceeds_and_reports() {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        let history = MemoryHistory::builder()
            .diagnostics(Diagnostics::with_sink(move |w: &Warning| {
                sink.lock().push(w.clone())
            }))
            .build();
        let _unblock = history.block("Leave this page?".into());

        history.push("/next", None);

        assert_eq!(history.location().pathname, "/next");
        assert_eq!(*warnings.lock(), vec![Warning::MissingUserConfirmation]);
    }

    #[test]
    fn deferred_confirmation_keeps_state_until_answered() {
        let parked: Arc<Mutex<Option<Responder>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        let history = MemoryHistory::builder()
            .user_confirmation(move |_: &str, responder: Responder| {
                *slot.lock() = Some(responder);
            })
            .build();
        let _unblock = history.block("Sure?".into());

        let pending = history.push("/later", None);
        assert!(pending.is_pending());
        assert_eq!(history.location().pathname, "/");

        let responder = parked.lock().take().unwrap();
        responder.respond(true);

        assert_eq!(history.location().pathname, "/later");
        assert_eq!(pending.outcome(), Some(TransitionOutcome::Approved));
    }

    #[test]
    fn redundant_state_is_reported_and_ignored() {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        let history = MemoryHistory::builder()
            .diagnostics(Diagnostics::with_sink(move |w: &Warning| {
                sink.lock().push(w.clone())
            }))
            .build();

        history.push(
            PartialLocation::new().pathname("/a").state(json!("inner")),
            Some(json!("outer")),
        );

        assert_eq!(history.location().state, Some(json!("inner")));
        assert_eq!(
            *warnings.lock(),
            vec![Warning::RedundantState {
                action: Action::Push
            }]
        );
    }

    #[test]
    fn listener_may_navigate_reentrantly() {
        let history = MemoryHistory::new();
        let redirector = history.clone();
        let _unlisten = history.listen(move |location: &Location, _| {
            if location.pathname == "/old" {
                redirector.replace("/new", None);
            }
        });

        history.push("/old", None);

        assert_eq!(history.location().pathname, "/new");
        assert_eq!(history.action(), Action::Replace);
        assert_eq!(history.length(), 2);
    }

    #[test]
    fn create_href_renders_path() {
        let history = MemoryHistory::new();
        let location = Location::from_descriptor("/a?b=1#c".into(), None, None, None);

        assert_eq!(history.create_href(&location), "/a?b=1#c");
    }
}
