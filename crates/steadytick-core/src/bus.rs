use crossbeam_channel::{Receiver, Sender};

use crate::error::LagOverrun;
use crate::sched::IterationReport;
use crate::telemetry::Telemetry;

/// Loop events forwarded by [`ChannelTelemetry`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    Opened { interval_ms: f64 },
    Iteration(IterationReport),
    LagOverrun(LagOverrun),
    Closed { final_tick: u64 },
}

/// Telemetry that pushes every loop event into a channel.
///
/// Sends are best-effort: a full or disconnected channel drops the event and
/// never stalls the loop.
pub struct ChannelTelemetry {
    tx: Sender<LoopEvent>,
    dropped: u64,
}

impl ChannelTelemetry {
    #[inline]
    pub fn new(tx: Sender<LoopEvent>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn unbounded() -> (Self, Receiver<LoopEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    pub fn bounded(cap: usize) -> (Self, Receiver<LoopEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(cap);
        (Self::new(tx), rx)
    }

    /// Events that could not be delivered.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    #[inline]
    fn try_send(&mut self, ev: LoopEvent) -> bool {
        let ok = self.tx.try_send(ev).is_ok();
        if !ok {
            self.dropped += 1;
        }
        ok
    }
}

impl Telemetry for ChannelTelemetry {
    fn open(&mut self, interval_ms: f64) {
        self.try_send(LoopEvent::Opened { interval_ms });
    }

    fn record_iteration(&mut self, report: &IterationReport) {
        self.try_send(LoopEvent::Iteration(report.clone()));
    }

    fn record_lag_overrun(&mut self, overrun: &LagOverrun) {
        self.try_send(LoopEvent::LagOverrun(*overrun));
    }

    fn close(&mut self, final_tick: u64) {
        self.try_send(LoopEvent::Closed { final_tick });
    }
}
