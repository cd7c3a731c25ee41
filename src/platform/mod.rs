//! Boundary to a host's own navigation stack.
//!
//! A platform-backed history does not own its stack: the host (a browser,
//! a webview, a test double) does, and the user can move it without asking
//! us. [`NavigationStack`] is the narrow surface the engine needs from such
//! a host: write primitives, the current entry, a capability probe, and two
//! pop notification channels.

mod simulated;

pub use simulated::{Navigation, SimulatedStack};

use crate::transition::{Responder, UserConfirmation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Payload persisted with every entry the engine writes to the host stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// What the host can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// There is a navigable document context at all.
    pub has_document: bool,
    /// The host supports writing entries without a full navigation.
    pub supports_history: bool,
    /// The primary channel also fires for hash-only changes. When false the
    /// fallback channel must be observed as well.
    pub pop_on_hash_change: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            has_document: true,
            supports_history: true,
            pop_on_hash_change: true,
        }
    }
}

/// Host notification channel for stack movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopChannel {
    /// Fires with the payload of the entry moved to.
    Primary,
    /// Fires without a payload; the current entry must be read back.
    Fallback,
}

/// One notification that the host stack moved.
#[derive(Clone, Debug, PartialEq)]
pub struct PopEvent {
    pub channel: PopChannel,
    pub entry: Option<EntryState>,
    /// Host-flagged spurious event (e.g. fired on initial page load).
    pub extraneous: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type PopHandler = Arc<dyn Fn(&PopEvent) + Send + Sync>;

/// A host-owned navigation stack.
///
/// Implementations must not call a subscribed handler while inside any of
/// these methods; handlers run from the host's own event delivery.
pub trait NavigationStack: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Number of entries in the host stack.
    fn length(&self) -> usize;

    /// Full path (pathname, search, hash) of the current entry as the host
    /// reports it, basename included.
    fn current_path(&self) -> String;

    /// Payload stored with the current entry, if the host has one.
    fn current_entry(&self) -> Option<EntryState>;

    /// Add an entry after the current one, discarding forward entries.
    fn push_entry(&self, entry: EntryState, href: &str);

    /// Overwrite the current entry.
    fn replace_entry(&self, entry: EntryState, href: &str);

    /// Move by `delta` entries. Movement is announced later through the
    /// primary channel.
    fn go(&self, delta: isize);

    /// Full navigation to `href`, adding an entry.
    fn assign(&self, href: &str);

    /// Full navigation to `href`, replacing the current entry.
    fn replace_document(&self, href: &str);

    /// Blocking yes/no dialog provided by the host.
    fn confirm_dialog(&self, message: &str) -> bool;

    fn subscribe(&self, channel: PopChannel, handler: PopHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// [`UserConfirmation`] backed by the host's own dialog; the default for a
/// platform-backed history.
pub struct PlatformConfirmation {
    stack: Arc<dyn NavigationStack>,
}

impl PlatformConfirmation {
    pub fn new(stack: Arc<dyn NavigationStack>) -> Self {
        Self { stack }
    }
}

impl UserConfirmation for PlatformConfirmation {
    fn confirm(&self, message: &str, responder: Responder) {
        responder.respond(self.stack.confirm_dialog(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capabilities_are_full() {
        let caps = Capabilities::default();
        assert!(caps.has_document);
        assert!(caps.supports_history);
        assert!(caps.pop_on_hash_change);
    }

    #[test]
    fn entry_state_omits_absent_fields() {
        let json = serde_json::to_string(&EntryState {
            key: Some("k".to_string()),
            state: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"key":"k"}"#);

        let parsed: EntryState = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, EntryState::default());
    }
}
