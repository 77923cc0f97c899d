use std::cell::Cell;
use std::rc::Rc;

/// Cloneable request-to-finish flag for a top-level delegate.
///
/// Controllers and observers hold a clone and call [`FinishHandle::request`]
/// from inside their callbacks. The delegate drains the flag between the steps of
/// `on_create` and when the in-flight host call returns, so pause, persist and
/// stop still fire exactly once.
#[derive(Debug, Clone, Default)]
pub struct FinishHandle {
    requested: Rc<Cell<bool>>,
}

impl FinishHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.get()
    }

    /// Consume a pending request.
    pub(crate) fn take(&self) -> bool {
        self.requested.replace(false)
    }
}
