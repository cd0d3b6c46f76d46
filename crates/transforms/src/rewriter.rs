//! Builds the scaling blocks and splices them in directly after the anchored call.
//!
//! Assembly example for `monsterChance` in `V_1` scaled up and `stoneChance` in `V_0` scaled
//! down:
//! ```assembly
//! call     MineShaft::adjustLevelChances/4
//! ldloc.s  V_1                                  // injected
//! call     ilsplice.FactorProvider::current_factor/0
//! mul
//! stloc.s  V_1
//! ldloc.s  V_0                                  // injected
//! call     ilsplice.FactorProvider::secondary_factor/0
//! div
//! stloc.s  V_0
//! ret                                           // original tail, shifted by 8
//! ```

use crate::factor::FactorSource;
use crate::plan::ScaleOp;
use crate::{Error, Result};
use ilsplice_core::{Instruction, InstructionStream, LocalSlot, Opcode, Operand};
use tracing::debug;

/// Instructions per injected block.
pub const BLOCK_LEN: usize = 4;

/// One straight-line block: `local = local <op> factor()`.
pub type InjectionBlock = [Instruction; BLOCK_LEN];

/// Builds the block for one local. Injected instructions never carry labels, so nothing can
/// branch into the middle of a block.
pub fn build_injection(
    slot: LocalSlot,
    source: FactorSource,
    operation: ScaleOp,
) -> InjectionBlock {
    let (load, store) = Opcode::short_form_for_local(slot.0);
    [
        Instruction::new(load, Operand::Local(slot)),
        Instruction::new(Opcode::Call, Operand::Method(source.signature())),
        Instruction::bare(operation.opcode()),
        Instruction::new(store, Operand::Local(slot)),
    ]
}

/// Returns a copy of `stream` with all `blocks` spliced as one contiguous run at
/// `call_index + 1`, in the given order.
///
/// The caller must have resolved and validated every anchor beforehand: this is the only
/// mutation of the patch, and it shifts every later index by `BLOCK_LEN * blocks.len()`.
pub fn insert_after(
    stream: &InstructionStream,
    call_index: usize,
    blocks: &[InjectionBlock],
) -> Result<InstructionStream> {
    let at = call_index
        .checked_add(1)
        .ok_or(ilsplice_core::result::Error::InsertOutOfBounds {
            index: call_index,
            len: stream.len(),
        })?;
    let expected = stream.len() + BLOCK_LEN * blocks.len();
    let mut patched = stream.clone();
    let run = blocks.iter().flat_map(|block| block.iter().cloned());
    let inserted = patched.insert_range(at, run)?;
    debug!("spliced {} instructions at {}", inserted, at);

    if patched.len() != expected {
        return Err(Error::SpliceLength {
            expected,
            actual: patched.len(),
        });
    }
    Ok(patched)
}

/// True if a factor block of any plan already follows the call.
///
/// A block is recognised by its shape: a local load, a call into the factor provider, `mul` or
/// `div`, and a store back to the same local.
pub fn is_spliced(stream: &InstructionStream, call_index: usize) -> bool {
    let Some(start) = call_index.checked_add(1) else {
        return false;
    };
    let Some(head) = stream.as_slice().get(start..).and_then(|rest| rest.get(..BLOCK_LEN)) else {
        return false;
    };
    let [load, call, op, store] = head else {
        return false;
    };

    let reads_factor = call
        .call_target()
        .is_some_and(|target| FactorSource::from_signature(target).is_some());
    load.op.is_local_load()
        && reads_factor
        && matches!(op.op, Opcode::Mul | Opcode::Div)
        && store.op.is_local_store()
        && load.local_slot() == store.local_slot()
}
