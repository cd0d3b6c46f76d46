//! Anchor resolution: turns fixed offsets from a call site into candidate instruction indices.
//!
//! This is index arithmetic only. Nothing here looks at the instructions themselves; whether an
//! index actually loads a local address is decided by [`crate::validator`]. Resolution is total:
//! an offset that points before the start of the stream yields a negative index instead of
//! faulting, and the validator reports it as a mismatch.

/// Computes `call_index + offset` for each offset, preserving order.
pub fn resolve_anchors(call_index: usize, offsets: &[isize]) -> Vec<isize> {
    let base = isize::try_from(call_index).unwrap_or(isize::MAX);
    offsets
        .iter()
        .map(|&offset| base.saturating_add(offset))
        .collect()
}
