//! Panicking checks for structural invariants of the ordered collections.

#[cold]
#[inline(never)]
fn violation(what: &str) -> ! {
    panic!("STEADYTICK INVARIANT VIOLATION: {what}");
}

#[inline]
pub fn require(cond: bool, what: &'static str) {
    if !cond {
        violation(what);
    }
}

/// The binary probe ran out of budget; the comparator is not a consistent order.
#[cold]
pub fn unsettled_probe(len: usize, probes: usize) -> ! {
    violation(&format!(
        "sorted insert did not settle after {probes} probes over {len} entries"
    ))
}
