//! Locates the call site a patch is anchored on.

use ilsplice_core::{InstructionStream, MethodSignature, Opcode};
use tracing::debug;

/// Returns the index of the first `call` whose target equals `signature`.
///
/// Matching is exact on owner, name and arity. `callvirt` is never matched: the anchored
/// targets are statically dispatched.
pub fn scan_for_call(stream: &InstructionStream, signature: &MethodSignature) -> Option<usize> {
    let found = stream.iter().position(|instr| {
        matches!(instr.op, Opcode::Call) && instr.call_target() == Some(signature)
    });
    debug!("scan for {}: {:?}", signature, found);
    found
}
