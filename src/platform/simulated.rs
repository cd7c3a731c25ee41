//! Deterministic in-process host stack.

use super::{
    Capabilities, EntryState, NavigationStack, PopChannel, PopEvent, PopHandler, SubscriptionId,
};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A full navigation the engine asked the host to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Assign(String),
    ReplaceDocument(String),
}

#[derive(Clone, Debug)]
struct SimEntry {
    href: String,
    entry: Option<EntryState>,
}

struct SimState {
    entries: Vec<SimEntry>,
    index: usize,
    subscribers: Vec<(SubscriptionId, PopChannel, PopHandler)>,
    queue: VecDeque<PopEvent>,
    next_id: u64,
    navigations: Vec<Navigation>,
    dialogs: Vec<String>,
    confirm_answer: bool,
}

/// A [`NavigationStack`] that lives entirely in memory.
///
/// It behaves like a browser tab: `go` moves the cursor immediately but the
/// pop notification is only queued, and is delivered when the host's event
/// loop turns, modelled here by [`SimulatedStack::flush`]. Tests use it to
/// play the part of a user pressing Back, and hosts without a real stack can
/// use it as one.
///
/// # Example
///
/// ```rust
/// use navstack::platform::{NavigationStack, SimulatedStack};
///
/// let stack = SimulatedStack::new("/start");
/// stack.assign("/next");
/// assert_eq!(stack.length(), 2);
///
/// stack.go(-1);
/// assert_eq!(stack.current_path(), "/start");
/// assert_eq!(stack.pending_events(), 1);
/// ```
pub struct SimulatedStack {
    capabilities: Capabilities,
    state: Mutex<SimState>,
}

impl SimulatedStack {
    pub fn new(initial_href: impl Into<String>) -> Self {
        Self::with_capabilities(initial_href, Capabilities::default())
    }

    pub fn with_capabilities(initial_href: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            state: Mutex::new(SimState {
                entries: vec![SimEntry {
                    href: initial_href.into(),
                    entry: None,
                }],
                index: 0,
                subscribers: Vec::new(),
                queue: VecDeque::new(),
                next_id: 0,
                navigations: Vec::new(),
                dialogs: Vec::new(),
                confirm_answer: true,
            }),
        }
    }

    /// Deliver queued pop events, including any queued while delivering.
    /// Returns how many events were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;

        loop {
            let mut state = self.state.lock();
            let Some(event) = state.queue.pop_front() else {
                return delivered;
            };
            let handlers: Vec<PopHandler> = state
                .subscribers
                .iter()
                .filter(|(_, channel, _)| *channel == event.channel)
                .map(|(_, _, handler)| handler.clone())
                .collect();
            drop(state);

            for handler in handlers {
                handler(&event);
            }
            delivered += 1;
        }
    }

    pub fn pending_events(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Queue a fallback-channel notification, as a host does on hash changes.
    pub fn fire_fallback(&self) {
        self.state.lock().queue.push_back(PopEvent {
            channel: PopChannel::Fallback,
            entry: None,
            extraneous: false,
        });
    }

    /// Queue a spurious primary notification carrying the current entry.
    pub fn fire_extraneous(&self) {
        let mut state = self.state.lock();
        let entry = state.entries[state.index].entry.clone();
        state.queue.push_back(PopEvent {
            channel: PopChannel::Primary,
            entry,
            extraneous: true,
        });
    }

    pub fn index(&self) -> usize {
        self.state.lock().index
    }

    pub fn hrefs(&self) -> Vec<String> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| e.href.clone())
            .collect()
    }

    pub fn entry_at(&self, index: usize) -> Option<EntryState> {
        self.state
            .lock()
            .entries
            .get(index)
            .and_then(|e| e.entry.clone())
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.state.lock().navigations.clone()
    }

    /// Messages shown through [`NavigationStack::confirm_dialog`].
    pub fn dialogs(&self) -> Vec<String> {
        self.state.lock().dialogs.clone()
    }

    /// Answer future dialogs with `answer`.
    pub fn set_confirm_answer(&self, answer: bool) {
        self.state.lock().confirm_answer = answer;
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

impl NavigationStack for SimulatedStack {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn length(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn current_path(&self) -> String {
        let state = self.state.lock();
        state.entries[state.index].href.clone()
    }

    fn current_entry(&self) -> Option<EntryState> {
        let state = self.state.lock();
        state.entries[state.index].entry.clone()
    }

    fn push_entry(&self, entry: EntryState, href: &str) {
        let mut state = self.state.lock();
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(SimEntry {
            href: href.to_string(),
            entry: Some(entry),
        });
        state.index = next;
    }

    fn replace_entry(&self, entry: EntryState, href: &str) {
        let mut state = self.state.lock();
        let index = state.index;
        state.entries[index] = SimEntry {
            href: href.to_string(),
            entry: Some(entry),
        };
    }

    fn go(&self, delta: isize) {
        let mut state = self.state.lock();
        let target = state.index as isize + delta;
        if delta == 0 || target < 0 || target >= state.entries.len() as isize {
            return;
        }

        state.index = target as usize;
        let entry = state.entries[state.index].entry.clone();
        state.queue.push_back(PopEvent {
            channel: PopChannel::Primary,
            entry,
            extraneous: false,
        });
    }

    fn assign(&self, href: &str) {
        let mut state = self.state.lock();
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(SimEntry {
            href: href.to_string(),
            entry: None,
        });
        state.index = next;
        state.navigations.push(Navigation::Assign(href.to_string()));
    }

    fn replace_document(&self, href: &str) {
        let mut state = self.state.lock();
        let index = state.index;
        state.entries[index] = SimEntry {
            href: href.to_string(),
            entry: None,
        };
        state
            .navigations
            .push(Navigation::ReplaceDocument(href.to_string()));
    }

    fn confirm_dialog(&self, message: &str) -> bool {
        let mut state = self.state.lock();
        state.dialogs.push(message.to_string());
        state.confirm_answer
    }

    fn subscribe(&self, channel: PopChannel, handler: PopHandler) -> SubscriptionId {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, channel, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state
            .lock()
            .subscribers
            .retain(|(other, _, _)| *other != id);
    }
}
