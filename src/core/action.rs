//! Classification of how the current location was reached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a history arrived at its current location.
///
/// Every engine starts out in [`Action::Pop`], mirroring a freshly loaded
/// page that was "popped" into view rather than pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// A new entry was added after the current one.
    Push,
    /// The current entry was overwritten in place.
    Replace,
    /// The cursor moved to an existing entry, forward or back.
    Pop,
}

impl Action {
    /// Upper-case name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Replace => "REPLACE",
            Self::Pop => "POP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
