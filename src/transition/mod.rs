//! Transition confirmation and change notification.
//!
//! Every navigation is proposed to a [`TransitionManager`] before it
//! commits. The manager consults the installed [`Prompt`] and, for message
//! prompts, an interactive [`UserConfirmation`] that may answer on a later
//! turn. The answer is delivered through a [`PendingTransition`] handle.
//! After a commit the manager fans the new location out to listeners.
//!
//! # Key Concepts
//!
//! - **Prompt**: at most one guard per history; it may allow, block, or ask
//! - **Pending transition**: resolves exactly once, or is cancelled when a
//!   newer transition starts before it was answered
//! - **Disposer**: idempotent handle undoing a `listen` or `block`

mod disposer;
mod manager;
mod pending;
mod prompt;

pub use disposer::Disposer;
pub use manager::{Listener, TransitionManager};
pub use pending::{PendingTransition, Responder, TransitionOutcome, UserConfirmation};
pub use prompt::{GuardFn, Prompt, PromptOutcome};
