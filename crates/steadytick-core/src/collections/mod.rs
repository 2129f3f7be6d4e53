pub mod comparator;
pub mod key;
pub mod pending;
pub mod sorted_insert;
pub mod sorted_queued_list;

pub use comparator::OrderPolicy;
pub use key::{EntityId, EntityKey, Keyed};
pub use pending::PendingQueue;
pub use sorted_insert::{insertion_index, sorted_insert};
pub use sorted_queued_list::{CommitHooks, CommitSummary, NoHooks, SortedQueuedList};
