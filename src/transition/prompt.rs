//! Prompts that can veto a pending transition.

use crate::core::{Action, Location};
use std::fmt;
use std::sync::Arc;

/// What a prompt decided about one proposed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Let the transition through.
    Allow,
    /// Cancel the transition.
    Block,
    /// Ask the user, showing this message.
    Ask(String),
}

impl From<bool> for PromptOutcome {
    fn from(allow: bool) -> Self {
        if allow {
            Self::Allow
        } else {
            Self::Block
        }
    }
}

impl From<&str> for PromptOutcome {
    fn from(message: &str) -> Self {
        Self::Ask(message.to_string())
    }
}

impl From<String> for PromptOutcome {
    fn from(message: String) -> Self {
        Self::Ask(message)
    }
}

/// Guard function consulted with the candidate location and action.
pub type GuardFn = dyn Fn(&Location, Action) -> PromptOutcome + Send + Sync;

/// The single guard a history can have installed.
///
/// # Example
///
/// ```rust
/// use navstack::core::{Action, Location, LocationDescriptor};
/// use navstack::transition::{Prompt, PromptOutcome};
///
/// let leave_settings = Prompt::guard(|location: &Location, _action: Action| {
///     if location.pathname.starts_with("/settings") {
///         PromptOutcome::Allow
///     } else {
///         PromptOutcome::Ask("Discard unsaved settings?".to_string())
///     }
/// });
///
/// let target = Location::from_descriptor(LocationDescriptor::from("/home"), None, None, None);
/// assert_eq!(
///     leave_settings.evaluate(&target, Action::Push),
///     PromptOutcome::Ask("Discard unsaved settings?".to_string())
/// );
/// ```
#[derive(Clone, Default)]
pub enum Prompt {
    /// Veto every transition.
    #[default]
    Deny,
    /// Ask the user with a fixed message before every transition.
    Message(String),
    /// Decide per transition.
    Guard(Arc<GuardFn>),
}

impl Prompt {
    pub fn guard<F>(guard: F) -> Self
    where
        F: Fn(&Location, Action) -> PromptOutcome + Send + Sync + 'static,
    {
        Self::Guard(Arc::new(guard))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Consult the prompt. A plain message behaves like a guard that always
    /// returns that message.
    pub fn evaluate(&self, location: &Location, action: Action) -> PromptOutcome {
        match self {
            Self::Deny => PromptOutcome::Block,
            Self::Message(message) => PromptOutcome::Ask(message.clone()),
            Self::Guard(guard) => guard(location, action),
        }
    }
}

impl From<&str> for Prompt {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for Prompt {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deny => f.write_str("Deny"),
            Self::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Self::Guard(_) => f.write_str("Guard(..)"),
        }
    }
}
