use dash_store::StoreError;

/// Counters for one batch invocation.
///
/// Owned by a single synchronizer run and handed back when it settles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    /// Operations dispatched.
    pub started: usize,
    /// Operations that succeeded.
    pub completed: usize,
    /// Failed operations in the order they settled.
    pub errors: Vec<(String, StoreError)>,
}

impl BatchProgress {
    /// Operations that have finished, successfully or not.
    #[must_use]
    pub fn settled(&self) -> usize {
        self.completed + self.errors.len()
    }

    /// Operations dispatched but not yet finished.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.started.saturating_sub(self.settled())
    }

    #[must_use]
    pub fn failed_paths(&self) -> Vec<&str> {
        self.errors.iter().map(|(path, _)| path.as_str()).collect()
    }
}
