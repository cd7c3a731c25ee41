//! Idempotent undo handles returned by `listen` and `block`.

use parking_lot::Mutex;
use std::fmt;

type Teardown = Box<dyn FnOnce() + Send>;

/// Undoes a registration when disposed.
///
/// Disposing takes effect immediately and only once; further calls do
/// nothing. Dropping a disposer without calling [`Disposer::dispose`] leaves
/// the registration in place.
pub struct Disposer {
    teardown: Mutex<Option<Teardown>>,
}

impl Disposer {
    pub(crate) fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    pub fn dispose(&self) {
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.teardown.lock().is_none()
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
