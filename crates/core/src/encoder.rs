//! Module for rendering instruction streams back into IL listings for the external installer.

use crate::decoder::Instruction;
use crate::stream::InstructionStream;
use std::fmt::Write;

/// Renders instructions as a listing that [`crate::decoder::parse_listing`] reads back.
///
/// # Arguments
/// * `instructions` - The instructions to render, in execution order.
/// * `with_indices` - Prefix every line with its stream index as a `#` comment column.
///
/// # Examples
/// ```rust,ignore
/// let listing = encode_listing(stream.as_slice(), false);
/// assert_eq!(parse_listing(&listing)?, stream.into_inner());
/// ```
pub fn encode_listing(instructions: &[Instruction], with_indices: bool) -> String {
    let mut out = String::with_capacity(instructions.len() * 24);
    for (index, ins) in instructions.iter().enumerate() {
        // writing into a String cannot fail
        let _ = if with_indices {
            let line = ins.to_string();
            writeln!(out, "{line:<48} # {index:04}")
        } else {
            writeln!(out, "{ins}")
        };
    }
    tracing::debug!("Encoded {} instructions", instructions.len());
    out
}

/// Convenience wrapper over [`encode_listing`] for a whole stream.
pub fn encode_stream(stream: &InstructionStream, with_indices: bool) -> String {
    encode_listing(stream.as_slice(), with_indices)
}
