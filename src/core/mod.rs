//! Core navigation values.
//!
//! This module holds the plain data the engines pass around:
//! - `Location` values and the descriptors used to build them
//! - The `Action` that classifies how a location was reached
//! - Path helpers and random key generation
//!
//! Nothing in here holds shared state or calls back into user code.

mod action;
mod key;
mod location;
pub mod path;

pub use action::Action;
pub use key::{KeyGenerator, DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH};
pub use location::{Location, LocationDescriptor, PartialLocation};
pub use path::PathParts;
