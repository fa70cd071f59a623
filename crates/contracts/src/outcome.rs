//! FlushOutcome - Dispatcher output
//!
//! Result of one dispatch cycle, consumed by metrics aggregation and tests.

/// What happened to the records drained by one dispatch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Cycle did not run because another cycle of the same channel was in flight
    pub skipped: bool,

    /// Records taken from the queue
    pub drained: usize,

    /// Records acknowledged by the transport and discarded
    pub delivered: usize,

    /// Records put back into the queue after a reported failure
    pub requeued: usize,

    /// Records that failed delivery and could not be requeued
    pub lost: usize,
}

impl FlushOutcome {
    /// Cycle skipped by the in-flight guard
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    /// Queue was empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing was drained (empty queue or skipped cycle)
    pub fn is_idle(&self) -> bool {
        self.drained == 0
    }

    /// Every drained record was acknowledged
    pub fn is_fully_delivered(&self) -> bool {
        !self.skipped && self.delivered == self.drained
    }
}
