use crate::collections::{CommitHooks, CommitSummary, EntityId, PendingQueue, SortedQueuedList};
use crate::config::{LagOverrunAction, SchedulerConfig};
use crate::entity::{BoxedEntity, Capability, Entity, EntityCtx};
use crate::error::{LagOverrun, Stage, StartupError, TickError, TickResult};
use crate::sync::StopHandle;
use crate::telemetry::{LogTelemetry, Telemetry};
use crate::time::{Clock, SystemClock};

use super::report::IterationReport;
use super::state::RunState;

/// Binds commit hooks to the entity lifecycle: insertion fires `start`, removal fires `end`.
struct LifecycleHooks<'a> {
    tick: u64,
    stop: &'a StopHandle,
    started: Vec<EntityId>,
}

impl<'a> LifecycleHooks<'a> {
    fn new(tick: u64, stop: &'a StopHandle) -> Self {
        Self {
            tick,
            stop,
            started: Vec::new(),
        }
    }
}

impl CommitHooks<BoxedEntity> for LifecycleHooks<'_> {
    type Error = TickError;

    fn on_removed(
        &mut self,
        entity: &mut BoxedEntity,
        queue: &mut PendingQueue<BoxedEntity>,
    ) -> TickResult<()> {
        let mut ctx = EntityCtx::new(self.tick, queue, self.stop);
        entity
            .end(&mut ctx)
            .map_err(|e| TickError::with_entity_stage(entity.id(), Stage::End, e))
    }

    fn on_insertion(
        &mut self,
        entity: &mut BoxedEntity,
        queue: &mut PendingQueue<BoxedEntity>,
    ) -> TickResult<()> {
        let mut ctx = EntityCtx::new(self.tick, queue, self.stop);
        entity
            .start(&mut ctx)
            .map_err(|e| TickError::with_entity_stage(entity.id(), Stage::Start, e))?;
        self.started.push(EntityId::from(entity.id()));
        Ok(())
    }
}

/// Fixed-timestep loop over a sorted, deferred-mutation set of entities.
///
/// Every iteration runs zero or more fixed `update` ticks to drain the time
/// backlog, committing queued attach/detach before each tick, then one
/// `frame_update` pass and one `render_frame` on the bound renderer.
///
/// `start()` blocks until stopped. Hosts that own their frame loop drive
/// `begin()`, `step()` and `finish()` themselves.
pub struct Scheduler {
    cfg: SchedulerConfig,
    update_interval_ms: f64,

    entities: SortedQueuedList<BoxedEntity>,
    clock: Box<dyn Clock>,
    telemetry: Box<dyn Telemetry>,
    stop: StopHandle,

    active: bool,
    renderer_id: Option<EntityId>,

    current_tick: u64,
    unprocessed_ms: f64,
    last_ms: f64,
}

impl Scheduler {
    /// Builds an idle scheduler from `cfg`.
    ///
    /// An invalid config is logged and used as is: an `update_rate` of 0 runs at
    /// 1 Hz (1000 ms ticks). Call [`SchedulerConfig::validate`] first to refuse it.
    pub fn new(cfg: SchedulerConfig) -> Self {
        if let Err(e) = cfg.validate() {
            log::warn!(target: "sched", "config: {e}; continuing with clamped values");
        }

        let update_interval_ms = cfg.update_interval_ms();
        let policy = cfg.loop_cfg.order_policy;
        let telemetry = LogTelemetry::new(&cfg.telemetry);

        Self {
            cfg,
            update_interval_ms,
            entities: SortedQueuedList::new(policy),
            clock: Box::new(SystemClock::new()),
            telemetry: Box::new(telemetry),
            stop: StopHandle::new(),
            active: false,
            renderer_id: None,
            current_tick: 0,
            unprocessed_ms: 0.0,
            last_ms: 0.0,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_telemetry(mut self, telemetry: impl Telemetry + 'static) -> Self {
        self.telemetry = Box::new(telemetry);
        self
    }

    /// Shares an externally created stop handle (e.g. one already wired to Ctrl-C).
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_entities<I>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = BoxedEntity>,
    {
        self.attach_all(entities);
        self
    }

    /* ============================
       Queued attach / detach
       ============================ */

    /// Queues an entity; it is committed and started at the next synchronization point.
    #[inline]
    pub fn attach<E: Entity + 'static>(&mut self, entity: E) {
        self.entities.queue_add(Box::new(entity));
    }

    #[inline]
    pub fn attach_boxed(&mut self, entity: BoxedEntity) {
        self.entities.queue_add(entity);
    }

    pub fn attach_all<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = BoxedEntity>,
    {
        self.entities.queue_add_all(entities);
    }

    /// Queues removal by id; the entity is ended at the next synchronization point.
    #[inline]
    pub fn detach(&mut self, id: impl Into<EntityId>) {
        self.entities.queue_remove(id);
    }

    pub fn detach_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.entities.queue_remove_all(ids);
    }

    /* ============================
       Run control
       ============================ */

    /// Runs the loop on the calling thread until stopped.
    ///
    /// A callback error ends the run: every committed entity still gets `end`
    /// (failures there are only logged) and telemetry is closed before the
    /// original error is returned.
    pub fn start(&mut self) -> TickResult<()> {
        self.begin()?;

        let mut outcome = Ok(());
        while self.stop.is_running() {
            if let Err(e) = self.step() {
                outcome = Err(e);
                break;
            }
        }

        match outcome {
            Ok(()) => self.finish(),
            Err(e) => {
                log::error!(target: "sched", "run aborted at tick {}: {e}", self.current_tick);
                if let Err(end_err) = self.finish() {
                    log::error!(target: "sched", "teardown after abort failed: {end_err}");
                }
                Err(e)
            }
        }
    }

    /// Prepares a run without looping.
    ///
    /// Entities left committed by a previous run get `start` again, pending
    /// attachments are committed (and started), then the renderer is located.
    /// Without a renderer every entity started here is ended again and
    /// `StartupError::NoRenderer` is returned.
    pub fn begin(&mut self) -> TickResult<()> {
        if self.active {
            return Err(StartupError::AlreadyRunning.into());
        }

        // Armed before any callback so a stop requested from `start` is kept.
        self.stop.arm();
        self.current_tick = 0;
        self.unprocessed_ms = 0.0;
        self.renderer_id = None;

        let mut started: Vec<EntityId> = Vec::new();
        let result = self
            .start_entities(&mut started)
            .and_then(|()| self.locate_renderer());

        if let Err(e) = result {
            log::warn!(target: "sched", "run refused: {e}");
            self.end_started(&started);
            self.stop.stop();
            return Err(e);
        }

        self.active = true;
        self.telemetry.open(self.update_interval_ms);
        self.last_ms = self.clock.now_ms();

        log::info!(
            target: "sched",
            "run started: interval_ms={:.3} entities={} renderer='{}'",
            self.update_interval_ms,
            self.entities.len(),
            self.renderer_id.as_ref().map(EntityId::as_str).unwrap_or_default()
        );
        Ok(())
    }

    /// One loop iteration.
    pub fn step(&mut self) -> TickResult<IterationReport> {
        if !self.active {
            return Err(TickError::NotRunning);
        }

        let now = self.clock.now_ms();
        let mut elapsed = now - self.last_ms;
        if !elapsed.is_finite() || elapsed < 0.0 {
            elapsed = 0.0;
        }
        self.last_ms = now;
        self.unprocessed_ms += elapsed;

        let mut report = IterationReport {
            elapsed_ms: elapsed,
            ..IterationReport::default()
        };

        if self.unprocessed_ms < self.update_interval_ms {
            if self.cfg.loop_cfg.sleep_when_idle {
                self.clock.sleep_ms(self.update_interval_ms - self.unprocessed_ms);
            }
            report.tick = self.current_tick;
            report.unprocessed_ms = self.unprocessed_ms;
            self.telemetry.record_iteration(&report);
            return Ok(report);
        }

        let cap = self.cfg.loop_cfg.max_catch_up_ticks;
        loop {
            let summary = self.commit_pending()?;
            report.inserted += summary.inserted.len() as u32;
            report.removed += summary.removed.len() as u32;
            report.rejected += summary.rejected.len() as u32;

            self.current_tick += 1;
            self.run_pass(Stage::Update)?;
            report.updates += 1;
            self.unprocessed_ms -= self.update_interval_ms;

            if !(self.unprocessed_ms > self.update_interval_ms && self.stop.is_running()) {
                break;
            }

            if cap > 0 && report.updates >= cap {
                let overrun = LagOverrun {
                    ticks: report.updates,
                    backlog_ms: self.unprocessed_ms,
                };
                self.handle_overrun(overrun)?;
                report.overrun = Some(overrun);
                break;
            }
        }

        self.run_pass(Stage::FrameUpdate)?;
        self.render()?;

        report.frame_ran = true;
        report.tick = self.current_tick;
        report.unprocessed_ms = self.unprocessed_ms;
        self.telemetry.record_iteration(&report);
        Ok(report)
    }

    /// Ends the run: `end` on every committed entity, last to first, then closes telemetry.
    ///
    /// Entities stay committed, so the next `start()` runs them again. Every
    /// entity gets its `end` even if an earlier one fails; the first failure is returned.
    pub fn finish(&mut self) -> TickResult<()> {
        if !self.active {
            return Err(TickError::NotRunning);
        }

        let tick = self.current_tick;
        let stop = &self.stop;
        let mut first_err: Option<TickError> = None;

        self.entities.for_each_mut_rev(|entity, queue| {
            let mut ctx = EntityCtx::new(tick, queue, stop);
            if let Err(e) = entity.end(&mut ctx) {
                let e = TickError::with_entity_stage(entity.id(), Stage::End, e);
                log::error!(target: "sched", "{e}");
                first_err.get_or_insert(e);
            }
        });

        self.stop.stop();
        self.active = false;
        self.renderer_id = None;
        self.telemetry.close(tick);

        log::info!(target: "sched", "run finished at tick {tick}");

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Requests a cooperative stop. Idempotent; the current iteration completes first.
    #[inline]
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Cloneable handle that can stop the loop from any thread.
    #[inline]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /* ============================
       Accessors
       ============================ */

    pub fn state(&self) -> RunState {
        match (self.active, self.stop.is_running()) {
            (false, _) => RunState::NotRunning,
            (true, true) => RunState::Running,
            (true, false) => RunState::Stopping,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Fixed tick length. Never below 1 Hz, even for `update_rate = 0`.
    #[inline]
    pub fn update_interval_ms(&self) -> f64 {
        self.update_interval_ms
    }

    #[inline]
    pub fn unprocessed_ms(&self) -> f64 {
        self.unprocessed_ms
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Committed entities in update order. Pending attachments are not visible here.
    #[inline]
    pub fn entities(&self) -> &SortedQueuedList<BoxedEntity> {
        &self.entities
    }

    #[inline]
    pub fn renderer_id(&self) -> Option<&str> {
        self.renderer_id.as_ref().map(EntityId::as_str)
    }

    /* ============================
       Internals
       ============================ */

    fn start_entities(&mut self, started: &mut Vec<EntityId>) -> TickResult<()> {
        let tick = self.current_tick;
        let stop = &self.stop;

        self.entities.try_for_each_mut::<TickError, _>(|entity, queue| {
            let mut ctx = EntityCtx::new(tick, queue, stop);
            entity
                .start(&mut ctx)
                .map_err(|e| TickError::with_entity_stage(entity.id(), Stage::Start, e))?;
            started.push(EntityId::from(entity.id()));
            Ok(())
        })?;

        let mut hooks = LifecycleHooks::new(tick, &self.stop);
        let committed = self.entities.commit_with(&mut hooks);
        started.append(&mut hooks.started);
        committed.map(|summary| log_commit(&summary))
    }

    /// Best-effort `end` for entities whose `start` already ran in a refused `begin`.
    fn end_started(&mut self, started: &[EntityId]) {
        let tick = self.current_tick;
        let stop = &self.stop;

        self.entities.for_each_mut_rev(|entity, queue| {
            if !started.iter().any(|id| id.as_str() == entity.id()) {
                return;
            }
            let mut ctx = EntityCtx::new(tick, queue, stop);
            if let Err(e) = entity.end(&mut ctx) {
                log::error!(
                    target: "sched",
                    "{}",
                    TickError::with_entity_stage(entity.id(), Stage::End, e)
                );
            }
        });
    }

    fn first_renderer(&self) -> Option<EntityId> {
        let at = self.entities.position_capable(Capability::Renderer)?;
        self.entities.keys().nth(at).map(|k| k.id.clone())
    }

    fn locate_renderer(&mut self) -> TickResult<()> {
        match self.first_renderer() {
            Some(id) => {
                self.renderer_id = Some(id);
                Ok(())
            }
            None => Err(StartupError::NoRenderer.into()),
        }
    }

    fn commit_pending(&mut self) -> TickResult<CommitSummary> {
        let mut hooks = LifecycleHooks::new(self.current_tick, &self.stop);
        let summary = self.entities.commit_with(&mut hooks)?;
        log_commit(&summary);
        self.rebind_renderer()?;
        Ok(summary)
    }

    /// Keeps `renderer_id` pointing at a committed renderer after a commit.
    fn rebind_renderer(&mut self) -> TickResult<()> {
        let lost = match &self.renderer_id {
            Some(id) if self.entities.contains_id(id.as_str()) => return Ok(()),
            Some(id) => id.clone(),
            None => EntityId::from(""),
        };

        match self.first_renderer() {
            Some(next) => {
                log::info!(target: "sched", "renderer rebound: '{lost}' -> '{next}'");
                self.renderer_id = Some(next);
                Ok(())
            }
            None => Err(TickError::RendererLost {
                entity_id: lost.as_str().to_string(),
            }),
        }
    }

    fn run_pass(&mut self, stage: Stage) -> TickResult<()> {
        let tick = self.current_tick;
        let stop = &self.stop;

        self.entities.try_for_each_mut(|entity, queue| {
            if !entity.enabled() {
                return Ok(());
            }
            let mut ctx = EntityCtx::new(tick, queue, stop);
            let r = match stage {
                Stage::Update => entity.update(tick, &mut ctx),
                Stage::FrameUpdate => entity.frame_update(tick, &mut ctx),
                _ => Ok(()),
            };
            r.map_err(|e| TickError::with_entity_stage(entity.id(), stage, e))
        })
    }

    fn render(&mut self) -> TickResult<()> {
        let tick = self.current_tick;
        let Some(id) = self.renderer_id.as_ref() else {
            return Err(TickError::other("no renderer bound"));
        };
        let Some(entity) = self.entities.get_by_id_mut(id.as_str()) else {
            return Err(TickError::RendererLost {
                entity_id: id.as_str().to_string(),
            });
        };
        let Some(renderer) = entity.as_renderer() else {
            return Err(TickError::with_entity_stage(
                id.as_str(),
                Stage::Render,
                TickError::other("declares the renderer capability but as_renderer() returned None"),
            ));
        };

        renderer
            .render_frame(tick)
            .map_err(|e| TickError::with_entity_stage(id.as_str(), Stage::Render, e))
    }

    fn handle_overrun(&mut self, overrun: LagOverrun) -> TickResult<()> {
        match self.cfg.loop_cfg.lag_overrun {
            LagOverrunAction::Fail => Err(TickError::LagOverrun(overrun)),
            LagOverrunAction::Drop => {
                log::warn!(
                    target: "sched",
                    "catch-up capped at {} ticks, dropping {:.3} ms of backlog",
                    overrun.ticks,
                    overrun.backlog_ms
                );
                self.telemetry.record_lag_overrun(&overrun);
                self.unprocessed_ms = 0.0;
                Ok(())
            }
        }
    }
}

fn log_commit(summary: &CommitSummary) {
    if summary.is_empty() {
        return;
    }
    log::debug!(
        target: "sched",
        "commit: +{} -{} rejected={}",
        summary.inserted.len(),
        summary.removed.len(),
        summary.rejected.len()
    );
}
