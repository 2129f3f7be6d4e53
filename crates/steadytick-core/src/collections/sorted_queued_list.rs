use std::convert::Infallible;

use super::comparator::OrderPolicy;
use super::key::{EntityId, EntityKey, Keyed};
use super::pending::{Entry, PendingQueue};
use super::sorted_insert::sorted_insert;

/// Extension points fired synchronously while a commit applies.
///
/// Both hooks get the pending queue so they can queue follow-up mutations;
/// those apply at the next commit, never in the batch being applied.
pub trait CommitHooks<T> {
    type Error;

    fn on_removed(&mut self, item: &mut T, queue: &mut PendingQueue<T>) -> Result<(), Self::Error>;

    fn on_insertion(&mut self, item: &mut T, queue: &mut PendingQueue<T>)
        -> Result<(), Self::Error>;
}

/// Hook binding that does nothing.
pub struct NoHooks;

impl<T> CommitHooks<T> for NoHooks {
    type Error = Infallible;

    #[inline]
    fn on_removed(&mut self, _item: &mut T, _queue: &mut PendingQueue<T>) -> Result<(), Infallible> {
        Ok(())
    }

    #[inline]
    fn on_insertion(
        &mut self,
        _item: &mut T,
        _queue: &mut PendingQueue<T>,
    ) -> Result<(), Infallible> {
        Ok(())
    }
}

/// What a single commit changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Ids erased from the committed set, in the order they were applied.
    pub removed: Vec<EntityId>,
    /// Ids inserted into the committed set, in the order they were applied.
    pub inserted: Vec<EntityId>,
    /// Additions dropped because their id was already committed.
    pub rejected: Vec<EntityId>,
}

impl CommitSummary {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty() && self.rejected.is_empty()
    }
}

/// Sorted collection whose structure only changes at explicit commit points.
///
/// `committed` is what readers and the scheduler see; `queue_*` calls only touch
/// the pending queue until `commit`/`commit_with` applies them.
pub struct SortedQueuedList<T> {
    entries: Vec<Entry<T>>,
    pending: PendingQueue<T>,
    policy: OrderPolicy,
}

impl<T> Default for SortedQueuedList<T> {
    fn default() -> Self {
        Self::new(OrderPolicy::default())
    }
}

impl<T> SortedQueuedList<T> {
    pub fn new(policy: OrderPolicy) -> Self {
        Self::with_capacity(policy, 0)
    }

    pub fn with_capacity(policy: OrderPolicy, capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            pending: PendingQueue::default(),
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /* ============================
       Queued mutation
       ============================ */

    #[inline]
    pub fn queue_remove(&mut self, id: impl Into<EntityId>) {
        self.pending.queue_remove(id);
    }

    pub fn queue_remove_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.pending.queue_remove_all(ids);
    }

    #[inline]
    pub fn pending(&self) -> &PendingQueue<T> {
        &self.pending
    }

    #[inline]
    pub fn pending_mut(&mut self) -> &mut PendingQueue<T> {
        &mut self.pending
    }

    /// Applies the pending queue without hooks.
    pub fn commit(&mut self) -> CommitSummary {
        match self.commit_with(&mut NoHooks) {
            Ok(summary) => summary,
            Err(never) => match never {},
        }
    }

    /// Applies the pending queue: every removal (erase, then `on_removed`) before
    /// any addition (sorted insert, then `on_insertion`).
    ///
    /// An addition whose id is already committed is dropped and reported in
    /// `rejected`; it never reaches `on_insertion`.
    ///
    /// A hook error stops the commit. An item whose `on_removed` failed stays
    /// erased; an item whose `on_insertion` failed is erased and dropped. The
    /// unapplied rest of the batch goes back to the front of the pending queue.
    pub fn commit_with<H>(&mut self, hooks: &mut H) -> Result<CommitSummary, H::Error>
    where
        H: CommitHooks<T>,
    {
        let (removals, additions) = self.pending.take();
        let mut summary = CommitSummary::default();

        let mut removals = removals.into_iter();
        while let Some(id) = removals.next() {
            let Some(at) = self.position(id.as_str()) else {
                log::debug!(target: "collections", "remove '{id}' ignored: not committed");
                continue;
            };

            let mut entry = self.entries.remove(at);
            summary.removed.push(id);
            if let Err(e) = hooks.on_removed(&mut entry.item, &mut self.pending) {
                self.pending.restore(removals.collect(), additions);
                return Err(e);
            }
        }

        let mut additions = additions.into_iter();
        while let Some(entry) = additions.next() {
            if self.contains_id(entry.key.id.as_str()) {
                log::warn!(
                    target: "collections",
                    "add '{}' rejected: id already committed",
                    entry.key.id
                );
                summary.rejected.push(entry.key.id);
                continue;
            }

            let policy = self.policy;
            let at = sorted_insert(&mut self.entries, entry, |a, b| {
                policy.compare(&a.key, &b.key)
            });
            if let Err(e) = hooks.on_insertion(&mut self.entries[at].item, &mut self.pending) {
                let failed = self.entries.remove(at);
                log::debug!(
                    target: "collections",
                    "add '{}' dropped: insertion hook failed",
                    failed.key.id
                );
                self.pending.restore(Vec::new(), additions.collect());
                return Err(e);
            }
            summary.inserted.push(self.entries[at].key.id.clone());
        }

        debug_assert!(self.is_order_sorted(), "committed entries out of order");
        Ok(summary)
    }

    /* ============================
       Committed iteration
       ============================ */

    /// Visits every committed item in order with access to the pending queue.
    pub fn try_for_each_mut<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut T, &mut PendingQueue<T>) -> Result<(), E>,
    {
        for entry in self.entries.iter_mut() {
            f(&mut entry.item, &mut self.pending)?;
        }
        Ok(())
    }

    /// Visits every committed item last to first.
    pub fn for_each_mut_rev<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T, &mut PendingQueue<T>),
    {
        for entry in self.entries.iter_mut().rev() {
            f(&mut entry.item, &mut self.pending);
        }
    }

    /* ============================
       Read-only queries (committed only)
       ============================ */

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    /// Mutable access to one committed item. The sort key is cached, so this cannot reorder it.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|e| &mut e.item)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &EntityKey> + ExactSizeIterator {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(|e| e.key.id.as_str())
    }

    #[inline]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key.id.as_str() == id)
    }

    #[inline]
    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&T> {
        self.position(id).and_then(|i| self.get(i))
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut T> {
        let i = self.position(id)?;
        self.get_mut(i)
    }

    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|&item| pred(item))
    }

    pub fn find_all<'a, P>(&'a self, mut pred: P) -> impl Iterator<Item = &'a T> + 'a
    where
        P: FnMut(&T) -> bool + 'a,
    {
        self.iter().filter(move |&item| pred(item))
    }

    fn is_order_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].key.order <= w[1].key.order)
    }
}

impl<T: Keyed> SortedQueuedList<T> {
    #[inline]
    pub fn queue_add(&mut self, item: T) {
        self.pending.queue_add(item);
    }

    pub fn queue_add_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.pending.queue_add_all(items);
    }

    /// Queues removal of whatever committed item shares `item`'s id.
    #[inline]
    pub fn queue_remove_item(&mut self, item: &T) {
        self.pending.queue_remove(item.key_id());
    }

    /// True if an item with the same id is committed.
    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.contains_id(item.key_id())
    }
}
