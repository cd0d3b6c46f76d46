//! This module decodes an IL listing and prints each instruction with its stream index, which
//! is what anchor offsets are counted against.

use async_trait::async_trait;
use clap::Args;
use ilsplice_core::encoder::encode_stream;
use ilsplice_core::read_listing;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub struct DecodeArgs {
    /// Path to an IL listing.
    pub input: PathBuf,
}

/// Executes the `decode` subcommand.
#[async_trait]
impl super::Command for DecodeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let stream = read_listing(&self.input)?;
        print!("{}", encode_stream(&stream, true));
        Ok(())
    }
}
