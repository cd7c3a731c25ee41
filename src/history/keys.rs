//! Best-effort shadow of a host stack's key order.

/// The key order a platform-backed history believes the host stack has.
///
/// The shadow only sees the writes this history made. Entries created by
/// other code, or keys lost across a reload, are unknown to it; lookups of
/// unknown keys fall back to position 0, so offsets computed from it can be
/// wrong.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyShadow {
    keys: Vec<Option<String>>,
}

impl KeyShadow {
    pub fn seeded(key: Option<String>) -> Self {
        Self { keys: vec![key] }
    }

    pub fn keys(&self) -> &[Option<String>] {
        &self.keys
    }

    pub fn position(&self, key: Option<&str>) -> Option<usize> {
        self.keys.iter().position(|k| k.as_deref() == key)
    }

    /// Record a push from `current`: forward keys are dropped and `next`
    /// appended. An unknown `current` truncates everything.
    pub fn record_push(&mut self, current: Option<&str>, next: Option<String>) {
        let keep = self.position(current).map_or(0, |index| index + 1);
        self.keys.truncate(keep);
        self.keys.push(next);
    }

    /// Record a replace of `current` by `next`. Unknown keys leave the
    /// shadow untouched.
    pub fn record_replace(&mut self, current: Option<&str>, next: Option<String>) {
        if let Some(index) = self.position(current) {
            self.keys[index] = next;
        }
    }

    /// Offset that moves the host from `from` back to `to`.
    pub fn revert_delta(&self, to: Option<&str>, from: Option<&str>) -> isize {
        let to = self.position(to).unwrap_or(0) as isize;
        let from = self.position(from).unwrap_or(0) as isize;
        to - from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Option<String> {
        Some(k.to_string())
    }

    #[test]
    fn push_truncates_after_current() {
        let mut shadow = KeyShadow::seeded(key("a"));
        shadow.record_push(Some("a"), key("b"));
        shadow.record_push(Some("b"), key("c"));
        shadow.record_push(Some("a"), key("d"));

        assert_eq!(shadow.keys(), &[key("a"), key("d")]);
    }

    #[test]
    fn push_from_unknown_key_restarts_shadow() {
        let mut shadow = KeyShadow::seeded(key("a"));
        shadow.record_push(Some("zzz"), key("b"));

        assert_eq!(shadow.keys(), &[key("b")]);
    }

    #[test]
    fn replace_overwrites_in_place() {
        let mut shadow = KeyShadow::seeded(key("a"));
        shadow.record_push(Some("a"), key("b"));
        shadow.record_replace(Some("a"), key("x"));
        shadow.record_replace(Some("nope"), key("y"));

        assert_eq!(shadow.keys(), &[key("x"), key("b")]);
    }

    #[test]
    fn missing_initial_key_is_tracked() {
        let mut shadow = KeyShadow::seeded(None);
        shadow.record_push(None, key("b"));

        assert_eq!(shadow.position(None), Some(0));
        assert_eq!(shadow.revert_delta(Some("b"), None), 1);
    }

    #[test]
    fn revert_delta_points_back() {
        let mut shadow = KeyShadow::seeded(key("a"));
        shadow.record_push(Some("a"), key("b"));
        shadow.record_push(Some("b"), key("c"));

        assert_eq!(shadow.revert_delta(Some("c"), Some("a")), 2);
        assert_eq!(shadow.revert_delta(Some("a"), Some("c")), -2);
    }

    #[test]
    fn unknown_keys_default_to_zero() {
        let mut shadow = KeyShadow::seeded(key("a"));
        shadow.record_push(Some("a"), key("b"));

        assert_eq!(shadow.revert_delta(Some("b"), Some("stranger")), 1);
        assert_eq!(shadow.revert_delta(Some("stranger"), Some("a")), 0);
    }
}
