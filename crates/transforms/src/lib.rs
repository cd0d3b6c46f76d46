pub mod anchor;
pub mod cost;
pub mod factor;
pub mod matcher;
pub mod pass;
pub mod pipeline;
pub mod plan;
pub mod rewriter;
pub mod simulate;
pub mod sink;
pub mod splice;
pub mod validator;

use ilsplice_core::InstructionStream;
use thiserror::Error;

/// Transform error type encompassing all transform module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Core operation failed.
    #[error("core operation failed: {0}")]
    Core(#[from] ilsplice_core::result::Error),

    /// The patch plan is inconsistent.
    #[error("invalid patch plan: {0}")]
    InvalidPlan(String),

    /// Failed to read a plan file.
    #[error("could not read plan '{path}': {source}")]
    PlanRead {
        /// The path to the plan file.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Plan JSON could not be decoded.
    #[error("plan decode failed: {0}")]
    PlanDecode(#[from] serde_json::Error),

    /// The splice produced a stream of unexpected length.
    #[error("splice length mismatch: expected {expected}, got {actual}")]
    SpliceLength {
        /// Length the splice should have produced.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
}

/// Transform result type
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for instruction stream transforms.
pub trait Transform: Send + Sync {
    /// Returns the transform's name for logging and identification.
    fn name(&self) -> &'static str;
    /// Applies the transform to the stream, returning whether changes were made.
    fn apply(&self, stream: &mut InstructionStream) -> Result<bool>;
}
