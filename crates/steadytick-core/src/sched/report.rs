use serde::Serialize;

use crate::error::LagOverrun;

/// Outcome of one loop iteration, handed to telemetry and returned by `step()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IterationReport {
    /// Wall time added to the backlog by this iteration.
    pub elapsed_ms: f64,
    /// Fixed updates executed. Zero for an idle iteration.
    pub updates: u32,
    /// Tick counter after the iteration.
    pub tick: u64,
    /// Backlog carried into the next iteration.
    pub unprocessed_ms: f64,
    /// Whether the frame pass and the renderer ran.
    pub frame_ran: bool,
    pub overrun: Option<LagOverrun>,
    pub inserted: u32,
    pub removed: u32,
    pub rejected: u32,
}

impl IterationReport {
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.frame_ran
    }
}
