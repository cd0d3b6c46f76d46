//! Module for the `patch` subcommand, which runs the patch pipeline over a listing and writes
//! the resulting listing for the installer.
//!
//! Failed patches are not errors unless `--strict` is given: the unmodified listing is written
//! and the failure is logged.

use crate::commands::{CliError, load_plan};
use async_trait::async_trait;
use clap::Args;
use ilsplice_core::encoder::encode_stream;
use ilsplice_core::read_listing;
use ilsplice_transform::pipeline::{PatchResult, patch};
use ilsplice_transform::sink::TracingSink;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

/// Arguments for the `patch` subcommand.
#[derive(Args)]
pub struct PatchArgs {
    /// Path to an IL listing of the host method body.
    pub input: PathBuf,
    /// JSON patch plan (default: built-in spawn-rate plan).
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Write the patched listing here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Path to emit a JSON patch report (optional).
    #[arg(long)]
    pub emit: Option<PathBuf>,
    /// Annotate the output listing with stream indices.
    #[arg(long)]
    pub indices: bool,
    /// Exit with an error if the method was not patched.
    #[arg(long)]
    pub strict: bool,
}

/// JSON report written by `--emit`.
#[derive(Debug, Serialize)]
pub struct PatchSummary {
    pub method: String,
    pub target: String,
    pub input_len: usize,
    pub output_len: usize,
    pub outcome: PatchResult,
}

/// Executes the `patch` subcommand.
#[async_trait]
impl super::Command for PatchArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let plan = load_plan(self.plan.as_deref())?;
        let stream = read_listing(&self.input)?;
        let input_len = stream.len();

        let report = patch(stream, &plan, &TracingSink);

        let listing = encode_stream(&report.stream, self.indices);
        match &self.output {
            Some(path) => fs::write(path, &listing).map_err(CliError::from)?,
            None => print!("{listing}"),
        }

        if let Some(path) = &self.emit {
            let summary = PatchSummary {
                method: plan.method.qualified_name(),
                target: plan.target.to_string(),
                input_len,
                output_len: report.stream.len(),
                outcome: report.result.clone(),
            };
            let json = serde_json::to_string_pretty(&summary).map_err(CliError::from)?;
            fs::write(path, json).map_err(CliError::from)?;
        }

        if self.strict && !report.result.is_patched() {
            return Err(CliError::NotPatched(format!("{:?}", report.result)).into());
        }
        Ok(())
    }
}
