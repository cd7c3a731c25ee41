//! The immutable location value and the partial descriptors callers use to
//! build one.

use super::path::{create_path, parse_path, resolve_pathname};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One navigable point in a history.
///
/// Locations are values: engines hand out clones, and nothing a caller does
/// to a clone affects the engine. Two locations may carry identical path
/// components and state while still being different entries; the `key`
/// tells them apart.
///
/// # Example
///
/// ```rust
/// use navstack::core::{Location, LocationDescriptor};
///
/// let location = Location::from_descriptor(
///     LocationDescriptor::from("/inbox?page=2#top"),
///     None,
///     Some("abc123".to_string()),
///     None,
/// );
///
/// assert_eq!(location.pathname, "/inbox");
/// assert_eq!(location.search, "?page=2");
/// assert_eq!(location.hash, "#top");
/// assert_eq!(location.path(), "/inbox?page=2#top");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub hash: String,
    /// Opaque caller payload; never inspected by the engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    /// Identity of this entry. `None` only for entries the platform handed
    /// us without one (e.g. the page a browser history was created on).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Location {
    /// Build a location from caller input.
    ///
    /// - A string descriptor is split with [`parse_path`] and takes `state`.
    /// - A partial descriptor keeps its own state when it has one, otherwise
    ///   takes `state`; non-empty `search`/`hash` get their `?`/`#` prefix.
    /// - `key`, when given, overrides any key on the descriptor.
    /// - With a `current` location, an empty pathname inherits the current
    ///   one and a relative pathname is resolved against it. Without one, an
    ///   empty pathname becomes `/`.
    pub fn from_descriptor(
        descriptor: LocationDescriptor,
        state: Option<Value>,
        key: Option<String>,
        current: Option<&Location>,
    ) -> Self {
        let mut location = match descriptor {
            LocationDescriptor::Path(path) => {
                let parts = parse_path(&path);
                Location {
                    pathname: parts.pathname,
                    search: parts.search,
                    hash: parts.hash,
                    state,
                    key: None,
                }
            }
            LocationDescriptor::Partial(partial) => Location {
                pathname: partial.pathname,
                search: with_prefix(partial.search, '?'),
                hash: with_prefix(partial.hash, '#'),
                state: partial.state.or(state),
                key: partial.key,
            },
        };

        if key.is_some() {
            location.key = key;
        }

        match current {
            Some(current) => {
                if location.pathname.is_empty() {
                    location.pathname = current.pathname.clone();
                } else if !location.pathname.starts_with('/') {
                    location.pathname = resolve_pathname(&location.pathname, &current.pathname);
                }
            }
            None => {
                if location.pathname.is_empty() {
                    location.pathname = String::from("/");
                }
            }
        }

        location
    }

    /// The location rendered back into a single path string.
    pub fn path(&self) -> String {
        create_path(&self.pathname, &self.search, &self.hash)
    }

    /// Same pathname, search, hash and state, ignoring the key.
    pub fn same_content(&self, other: &Location) -> bool {
        self.pathname == other.pathname
            && self.search == other.search
            && self.hash == other.hash
            && self.state == other.state
    }
}

fn with_prefix(part: String, prefix: char) -> String {
    if part.is_empty() || part.starts_with(prefix) {
        part
    } else {
        format!("{prefix}{part}")
    }
}

/// A location with every component optional, used as navigation input.
///
/// # Example
///
/// ```rust
/// use navstack::core::PartialLocation;
/// use serde_json::json;
///
/// let target = PartialLocation::new()
///     .pathname("/search")
///     .search("q=rust")
///     .state(json!({ "from": "toolbar" }));
///
/// assert_eq!(target.pathname, "/search");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialLocation {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl PartialLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Navigation input: either a path string or a partial location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationDescriptor {
    Path(String),
    Partial(PartialLocation),
}

impl LocationDescriptor {
    /// State carried by the descriptor itself, if any.
    pub fn state(&self) -> Option<&Value> {
        match self {
            Self::Path(_) => None,
            Self::Partial(partial) => partial.state.as_ref(),
        }
    }

    /// Key carried by the descriptor itself, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Partial(partial) => partial.key.as_deref(),
        }
    }
}

impl From<&str> for LocationDescriptor {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for LocationDescriptor {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&String> for LocationDescriptor {
    fn from(path: &String) -> Self {
        Self::Path(path.clone())
    }
}

impl From<PartialLocation> for LocationDescriptor {
    fn from(partial: PartialLocation) -> Self {
        Self::Partial(partial)
    }
}

impl From<Location> for LocationDescriptor {
    fn from(location: Location) -> Self {
        Self::Partial(PartialLocation {
            pathname: location.pathname,
            search: location.search,
            hash: location.hash,
            state: location.state,
            key: location.key,
        })
    }
}
