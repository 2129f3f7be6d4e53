#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use steadytick_core::{
    Capability, Entity, EntityCtx, ManualClock, NullTelemetry, Renderer, Scheduler,
    SchedulerConfig, Stage, TickError, TickResult,
};

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Drains everything recorded so far.
pub fn take(journal: &Journal) -> Vec<String> {
    std::mem::take(&mut *journal.lock())
}

pub type Script = Box<dyn FnMut(u64, &mut EntityCtx<'_>) -> TickResult<()>>;

/// Entity that records every callback as `"<stage>:<id>[:<tick>]"`.
pub struct Recorder {
    id: String,
    order: i32,
    enabled: bool,
    caps: Vec<Capability>,
    journal: Journal,
    fail_on: Option<(Stage, u64)>,
    on_start: Option<Script>,
    on_update: Option<Script>,
}

impl Recorder {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            order: 0,
            enabled: true,
            caps: Vec::new(),
            journal: journal.clone(),
            fail_on: None,
            on_start: None,
            on_update: None,
        }
    }

    pub fn renderer(id: &str, journal: &Journal) -> Self {
        Self::new(id, journal).with_caps(&[Capability::Renderer])
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_caps(mut self, caps: &[Capability]) -> Self {
        self.caps = caps.to_vec();
        self
    }

    /// Fails `stage` at `tick` (tick is ignored for start/end).
    pub fn fail_on(mut self, stage: Stage, tick: u64) -> Self {
        self.fail_on = Some((stage, tick));
        self
    }

    pub fn on_start(
        mut self,
        f: impl FnMut(u64, &mut EntityCtx<'_>) -> TickResult<()> + 'static,
    ) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_update(
        mut self,
        f: impl FnMut(u64, &mut EntityCtx<'_>) -> TickResult<()> + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    fn record(&self, entry: String) {
        self.journal.lock().push(entry);
    }

    fn check(&self, stage: Stage, tick: u64) -> TickResult<()> {
        match self.fail_on {
            Some((s, _)) if s == stage && matches!(s, Stage::Start | Stage::End) => {
                Err(TickError::other(format!("{} failed", stage.as_str())))
            }
            Some((s, t)) if s == stage && t == tick => {
                Err(TickError::other(format!("{} failed", stage.as_str())))
            }
            _ => Ok(()),
        }
    }
}

impl Entity for Recorder {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn capabilities(&self) -> &[Capability] {
        &self.caps
    }

    fn as_renderer(&mut self) -> Option<&mut dyn Renderer> {
        if self.caps.contains(&Capability::Renderer) {
            Some(self as &mut dyn Renderer)
        } else {
            None
        }
    }

    fn start(&mut self, ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        self.record(format!("start:{}", self.id));
        if let Some(f) = self.on_start.as_mut() {
            f(ctx.tick(), ctx)?;
        }
        self.check(Stage::Start, ctx.tick())
    }

    fn end(&mut self, ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        self.record(format!("end:{}", self.id));
        self.check(Stage::End, ctx.tick())
    }

    fn update(&mut self, tick: u64, ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        self.record(format!("update:{}:{tick}", self.id));
        if let Some(f) = self.on_update.as_mut() {
            f(tick, ctx)?;
        }
        self.check(Stage::Update, tick)
    }

    fn frame_update(&mut self, tick: u64, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        self.record(format!("frame:{}:{tick}", self.id));
        self.check(Stage::FrameUpdate, tick)
    }
}

impl Renderer for Recorder {
    fn render_frame(&mut self, tick: u64) -> TickResult<()> {
        self.record(format!("render:{}:{tick}", self.id));
        self.check(Stage::Render, tick)
    }
}

/// 100 updates per second (10 ms ticks), no idle sleep, quiet telemetry.
pub fn test_config() -> SchedulerConfig {
    let mut cfg = SchedulerConfig::default();
    cfg.loop_cfg.update_rate = 100;
    cfg.loop_cfg.sleep_when_idle = false;
    cfg.telemetry.log_rates = false;
    cfg
}

pub fn scheduler(cfg: SchedulerConfig) -> (Scheduler, ManualClock) {
    let clock = ManualClock::new();
    let sched = Scheduler::new(cfg)
        .with_clock(clock.clone())
        .with_telemetry(NullTelemetry);
    (sched, clock)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
