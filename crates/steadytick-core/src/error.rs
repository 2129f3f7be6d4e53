use std::error::Error;
use std::fmt;

use serde::Serialize;

/// Reasons a run refuses to start. The loop never enters `Running` when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// `start()`/`begin()` was called while a run is already active.
    AlreadyRunning,
    /// No committed entity declares the renderer capability.
    NoRenderer,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::AlreadyRunning => write!(f, "scheduler is already running"),
            StartupError::NoRenderer => write!(f, "no committed entity provides a renderer"),
        }
    }
}

impl Error for StartupError {}

/// Entity lifecycle stage used for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    End,
    Update,
    FrameUpdate,
    Render,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::End => "end",
            Stage::Update => "update",
            Stage::FrameUpdate => "frame_update",
            Stage::Render => "render",
        }
    }
}

/// Catch-up cap reached while backlog was still pending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagOverrun {
    /// Ticks executed in the iteration that hit the cap.
    pub ticks: u32,
    /// Unprocessed time left over when the cap was hit.
    pub backlog_ms: f64,
}

/// Scheduler-wide error.
///
/// Entities return it from their callbacks; the loop wraps those in `Entity` with the stage attached.
#[derive(Debug)]
pub enum TickError {
    Startup(StartupError),

    /// `step()`/`finish()` called outside an active run.
    NotRunning,

    /// An entity callback failed. Fatal for the run.
    Entity {
        entity_id: String,
        stage: Stage,
        cause: Box<TickError>,
    },

    LagOverrun(LagOverrun),

    /// The bound renderer left the committed set and nothing replaced it.
    RendererLost { entity_id: String },

    /// Generic error (fallback).
    Other(String),
}

impl TickError {
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[inline]
    pub fn with_entity_stage(entity_id: &str, stage: Stage, err: TickError) -> Self {
        match err {
            // Already attributed further down (e.g. a nested commit inside a hook).
            e @ TickError::Entity { .. } => e,
            other => TickError::Entity {
                entity_id: entity_id.to_string(),
                stage,
                cause: Box::new(other),
            },
        }
    }

    /// Stage of the failing callback, if this error came from an entity.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TickError::Entity { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickError::Startup(e) => write!(f, "startup failed: {e}"),
            TickError::NotRunning => write!(f, "scheduler is not running"),
            TickError::Entity {
                entity_id,
                stage,
                cause,
            } => write!(f, "entity '{entity_id}' stage {}: {cause}", stage.as_str()),
            TickError::LagOverrun(o) => write!(
                f,
                "lag overrun after {} ticks, {:.3} ms behind",
                o.ticks, o.backlog_ms
            ),
            TickError::RendererLost { entity_id } => {
                write!(f, "renderer '{entity_id}' was detached and no replacement is committed")
            }
            TickError::Other(s) => write!(f, "{s}"),
        }
    }
}

impl Error for TickError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TickError::Startup(e) => Some(e),
            TickError::Entity { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<StartupError> for TickError {
    #[inline]
    fn from(value: StartupError) -> Self {
        TickError::Startup(value)
    }
}

impl From<&str> for TickError {
    #[inline]
    fn from(value: &str) -> Self {
        TickError::Other(value.to_string())
    }
}

impl From<String> for TickError {
    #[inline]
    fn from(value: String) -> Self {
        TickError::Other(value)
    }
}

pub type TickResult<T> = Result<T, TickError>;
