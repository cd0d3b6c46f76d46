use async_trait::async_trait;
use clap::Subcommand;
use ilsplice_transform::plan::PatchPlan;
use std::error::Error;
use std::path::Path;

pub mod decode;
pub mod patch;
pub mod simulate;

use thiserror::Error;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// Listing could not be read or decoded.
    #[error("listing error: {0}")]
    Listing(#[from] ilsplice_core::result::Error),
    /// Patch plan or pipeline failure.
    #[error("transform error: {0}")]
    Transform(#[from] ilsplice_transform::Error),
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// `--strict` was given and the pipeline did not patch.
    #[error("method was not patched: {0}")]
    NotPatched(String),
}

/// CLI subcommands for ilsplice.
#[derive(Subcommand)]
pub enum Cmd {
    /// Decode a listing and print it with stream indices.
    Decode(decode::DecodeArgs),
    /// Run the patch pipeline over a listing.
    Patch(patch::PatchArgs),
    /// Patch a listing, then evaluate it against a local frame.
    Simulate(simulate::SimulateArgs),
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    ///
    /// # Returns
    /// A `Result` indicating success or an error if execution fails.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Decode(args) => args.execute().await,
            Cmd::Patch(args) => args.execute().await,
            Cmd::Simulate(args) => args.execute().await,
        }
    }
}

/// Loads the plan at `path`, or the built-in spawn-rate plan.
pub fn load_plan(path: Option<&Path>) -> Result<PatchPlan, CliError> {
    match path {
        Some(path) => Ok(PatchPlan::from_file(path)?),
        None => Ok(PatchPlan::spawn_rate()),
    }
}
