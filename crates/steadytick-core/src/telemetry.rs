use crate::config::TelemetryConfig;
use crate::error::LagOverrun;
use crate::sched::IterationReport;

/// Observer the scheduler reports to. Every method defaults to a no-op.
///
/// Lifecycle per run: `open` once from `begin()`, `record_*` from `step()`,
/// `close` once from `finish()` (also on the teardown path after a fatal error).
pub trait Telemetry {
    fn open(&mut self, _interval_ms: f64) {}

    fn record_iteration(&mut self, _report: &IterationReport) {}

    fn record_lag_overrun(&mut self, _overrun: &LagOverrun) {}

    fn close(&mut self, _final_tick: u64) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {}

/// Rate figures gathered by [`LogTelemetry`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateStats {
    /// Completed measurement windows.
    pub windows: u32,
    pub last_ups: f64,
    pub last_fps: f64,
    pub min_ups: f64,
    pub max_ups: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub overruns: u32,
}

/// Logs updates/frames per second over fixed windows of reported loop time.
///
/// Time comes from `IterationReport::elapsed_ms`, not from a wall clock, so the
/// numbers follow whatever clock drives the scheduler.
pub struct LogTelemetry {
    enabled: bool,
    period_ms: f64,

    window_ms: f64,
    window_updates: u32,
    window_frames: u32,

    stats: RateStats,
}

impl LogTelemetry {
    pub fn new(cfg: &TelemetryConfig) -> Self {
        Self {
            enabled: cfg.log_rates,
            period_ms: f64::from(cfg.log_period_ms.max(1)),
            window_ms: 0.0,
            window_updates: 0,
            window_frames: 0,
            stats: RateStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> RateStats {
        self.stats
    }

    fn flush_window(&mut self) {
        let secs = (self.window_ms / 1000.0).max(0.0001);
        let ups = f64::from(self.window_updates) / secs;
        let fps = f64::from(self.window_frames) / secs;

        let s = &mut self.stats;
        if s.windows == 0 {
            s.min_ups = ups;
            s.max_ups = ups;
            s.min_fps = fps;
            s.max_fps = fps;
        } else {
            s.min_ups = s.min_ups.min(ups);
            s.max_ups = s.max_ups.max(ups);
            s.min_fps = s.min_fps.min(fps);
            s.max_fps = s.max_fps.max(fps);
        }
        s.windows += 1;
        s.last_ups = ups;
        s.last_fps = fps;

        if self.enabled {
            log::info!(target: "telemetry", "ups={ups:.1} fps={fps:.1}");
        }

        self.window_ms = 0.0;
        self.window_updates = 0;
        self.window_frames = 0;
    }
}

impl Default for LogTelemetry {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

impl Telemetry for LogTelemetry {
    fn open(&mut self, interval_ms: f64) {
        self.window_ms = 0.0;
        self.window_updates = 0;
        self.window_frames = 0;
        self.stats = RateStats::default();
        if self.enabled {
            log::info!(target: "telemetry", "run opened: interval_ms={interval_ms:.3}");
        }
    }

    fn record_iteration(&mut self, report: &IterationReport) {
        self.window_ms += report.elapsed_ms.max(0.0);
        self.window_updates += report.updates;
        if report.frame_ran {
            self.window_frames += 1;
        }

        if self.window_ms >= self.period_ms {
            self.flush_window();
        }
    }

    fn record_lag_overrun(&mut self, overrun: &LagOverrun) {
        self.stats.overruns += 1;
        if self.enabled {
            log::warn!(
                target: "telemetry",
                "lag overrun: {} ticks, {:.3} ms dropped",
                overrun.ticks,
                overrun.backlog_ms
            );
        }
    }

    fn close(&mut self, final_tick: u64) {
        if !self.enabled {
            return;
        }
        let s = &self.stats;
        if s.windows == 0 {
            log::info!(target: "telemetry", "run closed at tick {final_tick} (no full window)");
            return;
        }
        log::info!(
            target: "telemetry",
            "run closed at tick {final_tick}: ups min={:.1} max={:.1}, fps min={:.1} max={:.1}, overruns={}",
            s.min_ups,
            s.max_ups,
            s.min_fps,
            s.max_fps,
            s.overruns
        );
    }
}
