//! `snatic deploy` command implementation.

use std::path::Path;

use clap::Args;

use super::{BuildArgs, resolve_layout, upload};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the deploy command.
#[derive(Args)]
pub(crate) struct DeployArgs {
    #[command(flatten)]
    build: BuildArgs,
}

impl DeployArgs {
    /// Build, then upload.
    pub(crate) fn execute(&self, root: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        let layout = resolve_layout(root)?;
        self.build.run(&layout, &output)?;
        upload::run(&layout, &output)
    }
}
