pub mod collections;
pub mod config;
pub mod entity;
pub mod error;
pub mod sched;
pub mod telemetry;
pub mod time;

pub mod core_invariants;
pub mod sync;
mod bus;

pub use bus::{ChannelTelemetry, LoopEvent};
pub use collections::{
    CommitHooks, CommitSummary, EntityId, EntityKey, Keyed, NoHooks, OrderPolicy, PendingQueue,
    SortedQueuedList,
};
pub use config::{ConfigError, LagOverrunAction, LoopConfig, SchedulerConfig, TelemetryConfig};
pub use entity::{BoxedEntity, Capability, Entity, EntityCtx, Renderer};
pub use error::{LagOverrun, Stage, StartupError, TickError, TickResult};
pub use sched::{IterationReport, RunState, Scheduler};
pub use sync::StopHandle;
pub use telemetry::{LogTelemetry, NullTelemetry, RateStats, Telemetry};
pub use time::{Clock, ManualClock, SystemClock};
