//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read file at the specified path.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Splice position lies past the end of the stream.
    #[error("insertion index {index} out of bounds for stream of length {len}")]
    InsertOutOfBounds {
        /// Requested insertion index.
        index: usize,
        /// Length of the stream at the time of insertion.
        len: usize,
    },

    /// A method signature string could not be parsed.
    #[error("invalid method signature: `{0}`")]
    InvalidSignature(String),

    /// A local slot was read or written outside the frame.
    #[error("local {slot} out of range for frame of {frame} slots")]
    LocalOutOfRange {
        /// Offending slot index.
        slot: u16,
        /// Number of slots in the frame.
        frame: usize,
    },

    /// Failed to parse a listing at the specified line.
    #[error("listing parse error at line {line}: {msg} ⇒ `{raw}`")]
    ParseError {
        /// The line number where parsing failed.
        line: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// Evaluation ran for more steps than the budget allows.
    #[error("evaluation exceeded {0} steps")]
    StepLimit(usize),

    /// The evaluator popped from an empty operand stack.
    #[error("stack underflow at instruction {0}")]
    StackUnderflow(usize),

    /// An operand of the wrong kind was found on the stack.
    #[error("type mismatch at instruction {index}: expected {expected}")]
    TypeMismatch {
        /// Index of the instruction that consumed the value.
        index: usize,
        /// The kind of value that was expected.
        expected: &'static str,
    },

    /// A branch names a label that no instruction carries.
    #[error("branch at instruction {index} targets unknown label IL_{label}")]
    UnresolvedLabel {
        /// Index of the branch instruction.
        index: usize,
        /// Numeric part of the missing label.
        label: u32,
    },

    /// A call target was not known to the resolver.
    #[error("unresolved call to {0}")]
    UnresolvedCall(String),

    /// The mnemonic does not name a known opcode.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),

    /// The opcode is not supported by the evaluator.
    #[error("unsupported opcode: {0}")]
    UnsupportedOpcode(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
