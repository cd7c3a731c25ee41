//! Random location keys.

use uuid::Uuid;

/// Key length used when none is configured.
pub const DEFAULT_KEY_LENGTH: usize = 6;

/// Longest key a generator will produce (one simple-format UUID).
pub const MAX_KEY_LENGTH: usize = 32;

/// Produces short random keys that identify one navigation within a history.
///
/// Keys are cut from the hex form of a v4 UUID. They are unique with
/// overwhelming probability for the lengths a history normally uses, and are
/// only ever compared for identity, never parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyGenerator {
    length: usize,
}

impl KeyGenerator {
    /// Create a generator; `length` is clamped into `1..=MAX_KEY_LENGTH`.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(1, MAX_KEY_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a fresh key.
    pub fn generate(&self) -> String {
        let mut key = Uuid::new_v4().simple().to_string();
        key.truncate(self.length);
        key
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_LENGTH)
    }
}
