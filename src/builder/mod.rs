//! Builder API for history construction.
//!
//! Builders are the primary way to configure a history. The data-only part
//! of the configuration also exists as serde option structs so a host can
//! load it from JSON and hand it to a builder with `.options(..)`.

pub mod browser;
pub mod error;
pub mod memory;
pub mod options;

pub use browser::BrowserHistoryBuilder;
pub use error::BuildError;
pub use memory::MemoryHistoryBuilder;
pub use options::{BrowserOptions, MemoryOptions};
