pub mod decoder;
pub mod encoder;
pub mod eval;
pub mod opcode;
pub mod result;
pub mod signature;
pub mod stream;

pub use decoder::{Instruction, Label, LocalSlot, Operand};
pub use opcode::Opcode;
pub use signature::MethodSignature;
pub use stream::InstructionStream;

/// Returns true if the instruction ends straight-line execution.
///
/// Terminal instructions are branches and `ret`; anything spliced into a method body must be
/// free of them so no other instruction can observe a partially executed block.
#[inline]
pub fn is_control_transfer(instruction: &Instruction) -> bool {
    instruction.op.is_branch() || matches!(instruction.op, Opcode::Ret)
}

/// High-level convenience function to turn a listing into an [`InstructionStream`].
///
/// # Example
/// ```rust,ignore
/// let stream = process_listing("ldloca.s V_0\ncall MineShaft::adjustLevelChances/4\nret")?;
/// assert_eq!(stream.len(), 3);
/// ```
pub fn process_listing(listing: &str) -> result::Result<InstructionStream> {
    let instructions = decoder::parse_listing(listing)?;
    tracing::debug!("Decoded listing into {} instructions", instructions.len());
    Ok(InstructionStream::new(instructions))
}

/// Reads a listing from disk and decodes it.
pub fn read_listing(path: &std::path::Path) -> result::Result<InstructionStream> {
    let text = std::fs::read_to_string(path).map_err(|source| result::Error::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    process_listing(&text)
}
