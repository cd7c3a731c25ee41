//! Path string helpers.
//!
//! Locations are addressed by a `pathname`, a `search` string (leading `?`)
//! and a `hash` (leading `#`). These helpers split a path string into those
//! parts and join them back, and handle the basename prefix a platform-backed
//! history strips from every path it reads.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Characters the URL parser would reinterpret or normalize inside a path.
/// They are escaped before resolution and restored after it.
const PATH_RESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'?')
    .add(b'#')
    .add(b'\\');

/// A path string split into its three components.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathParts {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

/// Split `path` into pathname, search and hash.
///
/// An empty path is treated as `/`. A bare `?` or `#` yields an empty search
/// or hash.
pub fn parse_path(path: &str) -> PathParts {
    let mut pathname = if path.is_empty() { "/" } else { path };
    let mut search = "";
    let mut hash = "";

    if let Some(index) = pathname.find('#') {
        hash = &pathname[index..];
        pathname = &pathname[..index];
    }

    if let Some(index) = pathname.find('?') {
        search = &pathname[index..];
        pathname = &pathname[..index];
    }

    PathParts {
        pathname: pathname.to_string(),
        search: if search == "?" { "" } else { search }.to_string(),
        hash: if hash == "#" { "" } else { hash }.to_string(),
    }
}

/// Join path components into one string.
///
/// Missing `?`/`#` prefixes are added; an empty pathname renders as `/`.
pub fn create_path(pathname: &str, search: &str, hash: &str) -> String {
    let mut path = if pathname.is_empty() {
        String::from("/")
    } else {
        pathname.to_string()
    };

    if !search.is_empty() && search != "?" {
        if !search.starts_with('?') {
            path.push('?');
        }
        path.push_str(search);
    }

    if !hash.is_empty() && hash != "#" {
        if !hash.starts_with('#') {
            path.push('#');
        }
        path.push_str(hash);
    }

    path
}

pub fn add_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

pub fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

pub fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// True when `path` starts with `prefix` (ASCII case-insensitive) followed by
/// `/`, `?`, `#` or the end of the string.
pub fn has_basename(path: &str, prefix: &str) -> bool {
    let Some(head) = path.get(..prefix.len()) else {
        return false;
    };

    if !head.eq_ignore_ascii_case(prefix) {
        return false;
    }

    matches!(
        path.as_bytes().get(prefix.len()),
        None | Some(b'/') | Some(b'?') | Some(b'#')
    )
}

/// Remove `prefix` from the front of `path` when [`has_basename`] holds.
pub fn strip_basename<'a>(path: &'a str, prefix: &str) -> &'a str {
    if has_basename(path, prefix) {
        &path[prefix.len()..]
    } else {
        path
    }
}

/// Normalize a configured basename: leading slash added, trailing slash
/// removed, empty stays empty.
pub fn normalize_basename(basename: &str) -> String {
    if basename.is_empty() {
        return String::new();
    }
    strip_trailing_slash(&add_leading_slash(basename)).to_string()
}

/// Resolve a relative pathname `to` against the pathname `from`, using URL
/// reference resolution (`b` against `/a/c` gives `/a/b`).
///
/// Only dot segments are merged: the result keeps the characters of both
/// inputs as given, without percent-encoding. An absolute `to` is returned
/// unchanged, and so is `to` if resolution fails.
pub fn resolve_pathname(to: &str, from: &str) -> String {
    if to.starts_with('/') {
        return to.to_string();
    }

    let escaped_to = utf8_percent_encode(to, PATH_RESERVED).to_string();
    let escaped_from = utf8_percent_encode(from, PATH_RESERVED).to_string();
    let resolved = Url::parse("http://localhost/").and_then(|mut base| {
        base.set_path(&escaped_from);
        base.join(&escaped_to)
    });

    match resolved {
        Ok(url) => percent_decode_str(url.path())
            .decode_utf8_lossy()
            .into_owned(),
        Err(err) => {
            tracing::debug!(to, from, error = %err, "pathname resolution failed");
            to.to_string()
        }
    }
}
