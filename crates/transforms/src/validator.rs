//! Confirms resolved anchors really load the address of a local.
//!
//! This is the guard against the host method changing shape between versions: if the fixed
//! offsets no longer line up with `ldloca` instructions the whole patch is rejected.

use ilsplice_core::{InstructionStream, LocalSlot};
use tracing::debug;

/// True iff `index` is in bounds and the instruction there is `ldloca`/`ldloca.s` with a local
/// operand.
pub fn validate_anchor(stream: &InstructionStream, index: isize) -> bool {
    anchor_slot(stream, index).is_some()
}

fn anchor_slot(stream: &InstructionStream, index: isize) -> Option<LocalSlot> {
    let instr = stream.get(usize::try_from(index).ok()?)?;
    if !instr.op.is_local_address_load() {
        return None;
    }
    instr.local_slot()
}

/// Validates every anchor before anything is touched.
///
/// Returns the addressed local of each anchor, in order, or the first anchor index that failed.
pub fn validate_anchors(
    stream: &InstructionStream,
    anchors: &[isize],
) -> Result<Vec<LocalSlot>, isize> {
    anchors
        .iter()
        .map(|&index| {
            let slot = anchor_slot(stream, index);
            debug!("anchor {}: {:?}", index, slot);
            slot.ok_or(index)
        })
        .collect()
}
