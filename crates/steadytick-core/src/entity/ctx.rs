use super::entity::{BoxedEntity, Entity};
use crate::collections::{EntityId, PendingQueue};
use crate::sync::StopHandle;

/// Context passed to entity callbacks.
///
/// Entities never get `&mut Scheduler`; everything they may do while the
/// committed set is being walked goes through here and is deferred.
pub struct EntityCtx<'a> {
    tick: u64,
    queue: &'a mut PendingQueue<BoxedEntity>,
    stop: &'a StopHandle,
}

impl<'a> EntityCtx<'a> {
    #[inline]
    pub fn new(tick: u64, queue: &'a mut PendingQueue<BoxedEntity>, stop: &'a StopHandle) -> Self {
        Self { tick, queue, stop }
    }

    /// Tick counter at the time of the callback.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Queues an entity; it starts at the next commit.
    #[inline]
    pub fn attach<E: Entity + 'static>(&mut self, entity: E) {
        self.queue.queue_add(Box::new(entity));
    }

    #[inline]
    pub fn attach_boxed(&mut self, entity: BoxedEntity) {
        self.queue.queue_add(entity);
    }

    pub fn attach_all<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = BoxedEntity>,
    {
        self.queue.queue_add_all(entities);
    }

    /// Queues removal by id; the entity ends at the next commit.
    #[inline]
    pub fn detach(&mut self, id: impl Into<EntityId>) {
        self.queue.queue_remove(id);
    }

    pub fn detach_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.queue.queue_remove_all(ids);
    }

    /// Asks the loop to finish its current iteration and exit.
    #[inline]
    pub fn request_stop(&self) {
        self.stop.stop();
    }

    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        !self.stop.is_running()
    }
}
