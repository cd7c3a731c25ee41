//! Builder for in-memory histories.

use crate::builder::options::MemoryOptions;
use crate::core::{KeyGenerator, LocationDescriptor, DEFAULT_KEY_LENGTH};
use crate::diagnostics::Diagnostics;
use crate::history::MemoryHistory;
use crate::transition::UserConfirmation;
use std::sync::Arc;

/// Builder for a [`MemoryHistory`] with a fluent API.
///
/// Building never fails: an empty entry list falls back to a single `/`
/// entry and an out-of-range index is clamped to the last entry.
pub struct MemoryHistoryBuilder {
    initial_entries: Vec<LocationDescriptor>,
    initial_index: usize,
    key_length: usize,
    confirmation: Option<Arc<dyn UserConfirmation>>,
    diagnostics: Diagnostics,
}

impl MemoryHistoryBuilder {
    pub fn new() -> Self {
        Self {
            initial_entries: Vec::new(),
            initial_index: 0,
            key_length: DEFAULT_KEY_LENGTH,
            confirmation: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replace the initial entry list.
    pub fn initial_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LocationDescriptor>,
    {
        self.initial_entries = entries.into_iter().map(Into::into).collect();
        self
    }

    /// Append one initial entry.
    pub fn initial_entry(mut self, entry: impl Into<LocationDescriptor>) -> Self {
        self.initial_entries.push(entry.into());
        self
    }

    pub fn initial_index(mut self, index: usize) -> Self {
        self.initial_index = index;
        self
    }

    pub fn key_length(mut self, length: usize) -> Self {
        self.key_length = length;
        self
    }

    /// Function that answers message prompts. Without one, message prompts
    /// let the transition through and report the misuse.
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

    /// Apply every field of `options`.
    pub fn options(self, options: MemoryOptions) -> Self {
        self.initial_entries(options.initial_entries)
            .initial_index(options.initial_index)
            .key_length(options.key_length)
    }

    pub fn build(self) -> MemoryHistory {
        MemoryHistory::assemble(
            self.initial_entries,
            self.initial_index,
            KeyGenerator::new(self.key_length),
            self.confirmation,
            self.diagnostics,
        )
    }
}

impl Default for MemoryHistoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
