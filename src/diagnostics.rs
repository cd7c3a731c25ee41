//! Non-fatal misuse reporting.
//!
//! Misuse never interrupts navigation. Each condition is logged through
//! `tracing` at `warn` level and, when the host installed one, handed to a
//! sink so it can be surfaced or counted.

use crate::core::Action;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A reportable, non-fatal condition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Warning {
    #[error(
        "avoid providing a separate state argument to {action} when the location already carries state; it is ignored"
    )]
    RedundantState { action: Action },

    #[error("a history supports only one prompt at a time")]
    PromptAlreadySet,

    #[error("a history needs a user confirmation function in order to use a prompt message")]
    MissingUserConfirmation,

    #[error("the host has no history API; {action} falls back to a full navigation and drops its state")]
    HistoryApiUnsupported { action: Action },

    #[error("path \"{path}\" does not begin with the basename \"{basename}\"")]
    BasenameMismatch { path: String, basename: String },
}

/// Callback receiving every reported [`Warning`].
pub type WarningSink = Arc<dyn Fn(&Warning) + Send + Sync>;

/// Diagnostic channel shared by an engine and its transition manager.
#[derive(Clone, Default)]
pub struct Diagnostics {
    sink: Option<WarningSink>,
}

impl Diagnostics {
    /// Log-only channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel that also forwards each warning to `sink`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use navstack::diagnostics::{Diagnostics, Warning};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let log = Arc::clone(&seen);
    /// let diagnostics = Diagnostics::with_sink(move |w: &Warning| {
    ///     log.lock().unwrap().push(w.clone());
    /// });
    ///
    /// diagnostics.report(Warning::PromptAlreadySet);
    /// assert_eq!(seen.lock().unwrap().len(), 1);
    /// ```
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&Warning) + Send + Sync + 'static,
    {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    pub fn report(&self, warning: Warning) {
        tracing::warn!(warning = %warning, "navigation misuse");
        if let Some(sink) = &self.sink {
            sink(&warning);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
