//! Navstack: session navigation history with confirmable transitions
//!
//! Navstack keeps an ordered stack of [`Location`]s with a cursor and routes
//! every navigation (push, replace, pop) through a confirmation gate before
//! it commits. Committed navigations are announced to listeners.
//!
//! # Core Concepts
//!
//! - **Location**: an immutable navigation point (pathname, search, hash,
//!   opaque JSON state and a per-entry key)
//! - **Transition Manager**: owns the single blocking prompt, asks for
//!   confirmation and fans out committed transitions to listeners
//! - **Engines**: [`MemoryHistory`] owns its stack; [`BrowserHistory`] writes
//!   through to a host-owned [`NavigationStack`](platform::NavigationStack)
//!   and undoes pops that a prompt rejects
//!
//! # Example
//!
//! ```rust
//! use navstack::{Action, History, MemoryHistory, Prompt};
//!
//! let history = MemoryHistory::builder()
//!     .initial_entries(["/", "/inbox"])
//!     .initial_index(1)
//!     .build();
//!
//! let unlisten = history.listen(|location, action| {
//!     println!("{action} {}", location.pathname);
//! });
//!
//! // Leaving the compose screen is not allowed.
//! let unblock = history.block(Prompt::guard(|location, _| {
//!     (location.pathname != "/compose").into()
//! }));
//!
//! history.push("/compose", None);
//! assert_eq!(history.location().pathname, "/inbox");
//!
//! unblock.dispose();
//! history.push("/compose", None);
//! assert_eq!(history.action(), Action::Push);
//! assert_eq!(history.length(), 3);
//!
//! unlisten.dispose();
//! ```

pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod history;
pub mod platform;
pub mod transition;

// Re-export commonly used types
pub use builder::{BrowserHistoryBuilder, BuildError, MemoryHistoryBuilder};
pub use core::{Action, Location, LocationDescriptor, PartialLocation};
pub use diagnostics::{Diagnostics, Warning};
pub use history::{BrowserHistory, History, MemoryHistory};
pub use transition::{Disposer, PendingTransition, Prompt, PromptOutcome, Responder};
