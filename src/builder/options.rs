//! Data-only history configuration, loadable from JSON.

use crate::builder::error::BuildError;
use crate::core::{LocationDescriptor, DEFAULT_KEY_LENGTH};
use serde::{Deserialize, Serialize};

/// Options for a [`MemoryHistory`](crate::history::MemoryHistory).
///
/// ```rust
/// use navstack::builder::MemoryOptions;
///
/// let options = MemoryOptions::from_json(r#"{ "initial_entries": ["/a", "/b"] }"#).unwrap();
/// assert_eq!(options.initial_entries.len(), 2);
/// assert_eq!(options.initial_index, 0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryOptions {
    pub initial_entries: Vec<LocationDescriptor>,
    pub initial_index: usize,
    pub key_length: usize,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            initial_entries: vec!["/".into()],
            initial_index: 0,
            key_length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl MemoryOptions {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for a [`BrowserHistory`](crate::history::BrowserHistory).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub basename: String,
    pub force_refresh: bool,
    pub key_length: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            basename: String::new(),
            force_refresh: false,
            key_length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl BrowserOptions {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }
}
