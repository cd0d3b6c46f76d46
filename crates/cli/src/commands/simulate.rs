//! Module for the `simulate` subcommand: patch a listing and execute the result over a frame
//! of locals, with the target call stubbed out, to show what the spliced blocks do.

use crate::commands::{CliError, load_plan};
use async_trait::async_trait;
use clap::Args;
use ilsplice_core::read_listing;
use ilsplice_transform::factor::{FactorConfig, FactorProvider, FactorSettings};
use ilsplice_transform::pipeline::{PatchResult, patch};
use ilsplice_transform::simulate::{FactorResolver, run};
use ilsplice_transform::sink::TracingSink;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `simulate` subcommand.
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to an IL listing of the host method body.
    pub input: PathBuf,
    /// JSON patch plan (default: built-in spawn-rate plan).
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Initial values of the locals, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub locals: Vec<f64>,
    /// Configured factor.
    #[arg(long, default_value_t = 1.0)]
    pub factor: f64,
    /// Disable scaling of secondary targets.
    #[arg(long)]
    pub no_secondary: bool,
    /// The target call is static, so no receiver is pushed before its arguments.
    #[arg(long)]
    pub static_target: bool,
}

/// What one simulation run produced.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub outcome: PatchResult,
    /// How many times the spliced blocks read a factor
    pub factor_calls: usize,
    /// Locals after the body returned
    pub locals: Vec<f64>,
}

impl SimulateArgs {
    /// Patches the listing, then evaluates the resulting body.
    pub fn simulate(&self) -> Result<SimulationReport, CliError> {
        let plan = load_plan(self.plan.as_deref())?;
        let stream = read_listing(&self.input)?;
        let report = patch(stream, &plan, &TracingSink);

        let config = FactorConfig::shared(FactorSettings {
            current_factor: self.factor,
            apply_secondary: !self.no_secondary,
        });
        let resolver = FactorResolver::new(FactorProvider::new(config));
        let mut resolver = if self.static_target {
            resolver.stub(plan.target.clone())
        } else {
            resolver.stub_instance(plan.target.clone())
        };
        let frame = run(&report.stream, self.locals.clone(), &mut resolver)?;

        Ok(SimulationReport {
            outcome: report.result,
            factor_calls: resolver.factor_calls,
            locals: frame.locals,
        })
    }
}

/// Executes the `simulate` subcommand.
#[async_trait]
impl super::Command for SimulateArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let report = self.simulate()?;
        println!("{}", serde_json::to_string_pretty(&report).map_err(CliError::from)?);
        Ok(())
    }
}
