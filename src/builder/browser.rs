//! Builder for platform-backed histories.

use crate::builder::error::BuildError;
use crate::builder::options::BrowserOptions;
use crate::core::{KeyGenerator, DEFAULT_KEY_LENGTH};
use crate::diagnostics::Diagnostics;
use crate::history::BrowserHistory;
use crate::platform::NavigationStack;
use crate::transition::UserConfirmation;
use std::sync::Arc;

/// Builder for a [`BrowserHistory`] over a host stack.
pub struct BrowserHistoryBuilder {
    stack: Arc<dyn NavigationStack>,
    basename: String,
    force_refresh: bool,
    key_length: usize,
    confirmation: Option<Arc<dyn UserConfirmation>>,
    diagnostics: Diagnostics,
}

impl BrowserHistoryBuilder {
    pub fn new(stack: Arc<dyn NavigationStack>) -> Self {
        Self {
            stack,
            basename: String::new(),
            force_refresh: false,
            key_length: DEFAULT_KEY_LENGTH,
            confirmation: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Path prefix shared by every entry. A leading slash is added and a
    /// trailing one removed.
    pub fn basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    /// Perform a full host navigation after every push and replace.
    pub fn force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    pub fn key_length(mut self, length: usize) -> Self {
        self.key_length = length;
        self
    }

    /// Function that answers message prompts. Defaults to the host dialog.
    pub fn user_confirmation<C>(mut self, confirmation: C) -> Self
    where
        C: UserConfirmation + 'static,
    {
        self.confirmation = Some(Arc::new(confirmation));
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn options(self, options: BrowserOptions) -> Self {
        self.basename(options.basename)
            .force_refresh(options.force_refresh)
            .key_length(options.key_length)
    }

    /// Build the history.
    /// Returns an error if the host has no navigable document.
    pub fn build(self) -> Result<BrowserHistory, BuildError> {
        BrowserHistory::assemble(
            self.stack,
            &self.basename,
            self.force_refresh,
            KeyGenerator::new(self.key_length),
            self.confirmation,
            self.diagnostics,
        )
    }
}
