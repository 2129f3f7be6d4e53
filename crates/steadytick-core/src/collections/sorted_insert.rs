use std::cmp::Ordering;

use crate::core_invariants::{require, unsettled_probe};

/// Finds where `item` goes in an already sorted `seq`.
///
/// Empty sequences and items ranking at or after the last element append.
/// Otherwise the probe starts at `len / 2` and moves by a shrinking step of
/// `ceil((upper - lower) / 2)` until the item fits between its neighbours.
/// The probe order decides which slot wins when the comparator reports ties,
/// so this must not be swapped for `partition_point`.
pub fn insertion_index<T, F>(seq: &[T], item: &T, mut cmp: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = seq.len();
    if len == 0 {
        return 0;
    }

    if cmp(item, &seq[len - 1]) != Ordering::Less {
        return len;
    }

    let mut lower = 0usize;
    let mut upper = len;
    let mut i = len / 2;

    // A total order converges in O(log n) probes.
    let budget = len + 2;
    for _ in 0..budget {
        let after_prev = i == 0 || cmp(item, &seq[i - 1]) != Ordering::Less;
        let before_cur = i == len || cmp(item, &seq[i]) != Ordering::Greater;
        if after_prev && before_cur {
            return i;
        }

        require(i < len, "sorted insert probed past the end");

        if cmp(item, &seq[i]) == Ordering::Less {
            upper = i;
            i -= step(lower, upper);
        } else {
            lower = i;
            i += step(lower, upper);
        }
    }

    unsettled_probe(len, budget)
}

/// Inserts `item` at the slot chosen by [`insertion_index`] and returns that slot.
pub fn sorted_insert<T, F>(seq: &mut Vec<T>, item: T, cmp: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let at = insertion_index(seq, &item, cmp);
    seq.insert(at, item);
    at
}

#[inline]
fn step(lower: usize, upper: usize) -> usize {
    (upper - lower + 1) / 2
}
