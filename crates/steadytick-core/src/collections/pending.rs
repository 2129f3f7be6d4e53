use super::key::{EntityId, EntityKey, Keyed};

/// A queued addition with its key captured at enqueue time.
pub(crate) struct Entry<T> {
    pub(crate) key: EntityKey,
    pub(crate) item: T,
}

/// Structural changes waiting for the next commit.
///
/// Removals and additions live in separate queues; a commit drains every
/// removal before it looks at any addition, whatever order they were queued in.
pub struct PendingQueue<T> {
    removals: Vec<EntityId>,
    additions: Vec<Entry<T>>,
}

impl<T> Default for PendingQueue<T> {
    fn default() -> Self {
        Self {
            removals: Vec::new(),
            additions: Vec::new(),
        }
    }
}

impl<T: Keyed> PendingQueue<T> {
    #[inline]
    pub fn queue_add(&mut self, item: T) {
        let key = item.key();
        self.additions.push(Entry { key, item });
    }

    pub fn queue_add_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.queue_add(item);
        }
    }
}

impl<T> PendingQueue<T> {
    #[inline]
    pub fn queue_remove(&mut self, id: impl Into<EntityId>) {
        self.removals.push(id.into());
    }

    pub fn queue_remove_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        for id in ids {
            self.queue_remove(id);
        }
    }

    /// Queued removal ids, in enqueue order.
    #[inline]
    pub fn removals(&self) -> &[EntityId] {
        &self.removals
    }

    /// Keys of queued additions, in enqueue order.
    pub fn addition_keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.additions.iter().map(|e| &e.key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.removals.len() + self.additions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }

    /// Puts an unapplied remainder back ahead of anything queued since `take`.
    pub(crate) fn restore(&mut self, mut removals: Vec<EntityId>, mut additions: Vec<Entry<T>>) {
        removals.append(&mut self.removals);
        additions.append(&mut self.additions);
        self.removals = removals;
        self.additions = additions;
    }

    /// Moves everything out, leaving an empty queue for mutations issued while the batch applies.
    #[inline]
    pub(crate) fn take(&mut self) -> (Vec<EntityId>, Vec<Entry<T>>) {
        (
            std::mem::take(&mut self.removals),
            std::mem::take(&mut self.additions),
        )
    }
}
