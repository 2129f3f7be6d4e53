use super::capability::{Capability, Renderer};
use super::ctx::EntityCtx;
use crate::collections::Keyed;
use crate::error::TickResult;

/// A unit scheduled by the loop.
///
/// `id` and `order` are read once when the entity is queued; the collection
/// keeps that snapshot, so they should be fixed at construction.
///
/// Callbacks may queue attach/detach through the context. They must not try to
/// reach the committed set directly. Returning an error is fatal for the run.
pub trait Entity {
    fn id(&self) -> &str;

    /// Update priority. Lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Disabled entities still get `start`/`end` but are skipped by the update and frame passes.
    fn enabled(&self) -> bool {
        true
    }

    /// Capability tags used for lookups such as locating the renderer.
    fn capabilities(&self) -> &[Capability] {
        &[]
    }

    /// Renderer view of this entity. Must return `Some` when `capabilities()` lists `Renderer`.
    fn as_renderer(&mut self) -> Option<&mut dyn Renderer> {
        None
    }

    /// Fired once when the entity enters the committed set (or when a run begins with it committed).
    fn start(&mut self, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        Ok(())
    }

    /// Fired once when the entity leaves the committed set (or when the run ends).
    fn end(&mut self, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        Ok(())
    }

    /// Fixed-rate step.
    fn update(&mut self, _tick: u64, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        Ok(())
    }

    /// Once per loop iteration, after catch-up and before the renderer.
    fn frame_update(&mut self, _tick: u64, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        Ok(())
    }
}

pub type BoxedEntity = Box<dyn Entity>;

impl<E: Entity + ?Sized> Keyed for Box<E> {
    #[inline]
    fn key_id(&self) -> &str {
        self.id()
    }

    #[inline]
    fn key_order(&self) -> i32 {
        self.order()
    }
}
