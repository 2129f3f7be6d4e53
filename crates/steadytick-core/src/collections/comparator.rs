use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::key::EntityKey;

/// How committed entities are ranked.
///
/// Both policies treat equal ids as `Equal`; that is how the collection
/// recognises a duplicate identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Ascending `order`, ties broken by lexical id. A total order.
    #[default]
    IdTieBreak,

    /// `Less` only when `a.order < b.order`, otherwise `Greater`.
    ///
    /// Not antisymmetric for equal orders with distinct ids: `compare(a, b)` and
    /// `compare(b, a)` are both `Greater`. In practice a newcomer lands after the
    /// run of equal-order entities it is probed against.
    Legacy,
}

impl OrderPolicy {
    pub fn compare(self, a: &EntityKey, b: &EntityKey) -> Ordering {
        if a.id == b.id {
            return Ordering::Equal;
        }

        match self {
            OrderPolicy::IdTieBreak => a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)),
            OrderPolicy::Legacy => {
                if a.order < b.order {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(order: i32, id: &str) -> EntityKey {
        EntityKey::new(order, id)
    }

    #[test]
    fn same_id_is_equal_regardless_of_order() {
        for policy in [OrderPolicy::IdTieBreak, OrderPolicy::Legacy] {
            assert_eq!(policy.compare(&key(1, "a"), &key(9, "a")), Ordering::Equal);
        }
    }

    #[test]
    fn tie_break_is_antisymmetric() {
        let p = OrderPolicy::IdTieBreak;
        let (a, b) = (key(3, "alpha"), key(3, "beta"));
        assert_eq!(p.compare(&a, &b), Ordering::Less);
        assert_eq!(p.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn legacy_reports_greater_both_ways_on_equal_order() {
        let p = OrderPolicy::Legacy;
        let (a, b) = (key(3, "alpha"), key(3, "beta"));
        assert_eq!(p.compare(&a, &b), Ordering::Greater);
        assert_eq!(p.compare(&b, &a), Ordering::Greater);
        assert_eq!(p.compare(&key(1, "x"), &key(2, "y")), Ordering::Less);
        assert_eq!(p.compare(&key(2, "x"), &key(1, "y")), Ordering::Greater);
    }
}
