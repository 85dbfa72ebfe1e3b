//! Settlement state machine for one batch.
//!
//! The batch settles once: `Running` moves to `Succeeded` only after dispatch
//! has finished and every started operation succeeded, or to `Failed` on the
//! first recorded failure. Outcomes recorded after settlement update the
//! counters but never the result.

use dash_store::StoreError;

use crate::progress::BatchProgress;

/// The first failure and how much was still in flight when it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFailure {
    pub path: String,
    pub error: StoreError,
    pub unresolved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Running,
    Succeeded,
    Failed(FirstFailure),
}

#[derive(Debug)]
pub struct BatchState {
    all_started: bool,
    phase: Phase,
    progress: BatchProgress,
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_started: false,
            phase: Phase::Running,
            progress: BatchProgress::default(),
        }
    }

    pub const fn record_started(&mut self) {
        self.progress.started += 1;
    }

    /// Close the dispatch wave. An empty or already finished batch settles here.
    pub fn finish_dispatch(&mut self) {
        self.all_started = true;
        self.try_succeed();
    }

    /// Record one finished operation.
    ///
    /// Returns `true` for a success, which the caller reports as progress.
    pub fn record(&mut self, path: String, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => {
                self.progress.completed += 1;
                self.try_succeed();
                true
            }
            Err(error) => {
                if self.phase == Phase::Running {
                    self.phase = Phase::Failed(FirstFailure {
                        path: path.clone(),
                        error: error.clone(),
                        unresolved: self.progress.unresolved().saturating_sub(1),
                    });
                }
                self.progress.errors.push((path, error));
                false
            }
        }
    }

    fn try_succeed(&mut self) {
        if self.phase == Phase::Running
            && self.all_started
            && self.progress.completed == self.progress.started
        {
            self.phase = Phase::Succeeded;
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub const fn progress(&self) -> &BatchProgress {
        &self.progress
    }

    /// Hand out the final phase and counters.
    #[must_use]
    pub fn into_parts(self) -> (Phase, BatchProgress) {
        (self.phase, self.progress)
    }
}
