use std::borrow::Borrow;
use std::fmt;

/// Identity key of a scheduled entity.
///
/// Ordering is lexical on the underlying string; the id tie-break policy relies on it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(Box<str>);

impl EntityId {
    #[inline]
    pub fn new(raw: &str) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl From<&String> for EntityId {
    #[inline]
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&EntityId> for EntityId {
    #[inline]
    fn from(value: &EntityId) -> Self {
        value.clone()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key snapshotted when an item is queued.
///
/// The collection only ever compares keys, so an item cannot move itself
/// out of order after it has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub order: i32,
    pub id: EntityId,
}

impl EntityKey {
    #[inline]
    pub fn new(order: i32, id: impl Into<EntityId>) -> Self {
        Self {
            order,
            id: id.into(),
        }
    }
}

/// Anything the sorted collection can hold: it must name itself and its priority.
pub trait Keyed {
    fn key_id(&self) -> &str;
    fn key_order(&self) -> i32;

    #[inline]
    fn key(&self) -> EntityKey {
        EntityKey::new(self.key_order(), self.key_id())
    }
}
