//! `snatic build` command implementation.

use std::path::Path;

use clap::Args;
use snatic_config::ProjectLayout;
use snatic_site::SiteBuilder;

use super::resolve_layout;
use crate::error::CliError;
use crate::output::Output;
use crate::php;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Do not install the front controller's PHP dependency.
    #[arg(long)]
    skip_composer: bool,
}

impl BuildArgs {
    pub(crate) fn execute(&self, root: Option<&Path>) -> Result<(), CliError> {
        let layout = resolve_layout(root)?;
        self.run(&layout, &Output::new())
    }

    /// Build `layout` into its output directory.
    pub(crate) fn run(&self, layout: &ProjectLayout, output: &Output) -> Result<(), CliError> {
        output.step(&format!("Building {}", layout.root().display()));

        let report = SiteBuilder::new(layout.clone()).build()?;
        output.build_report(&report);

        if self.skip_composer {
            output.warning("Skipped PHP dependency installation");
        } else {
            output.info("Installing PHP dependencies...");
            php::install_front_controller(&layout.output_dir())?;
        }

        output.success(&format!(
            "Site built successfully to {}",
            layout.output_dir().display()
        ));
        Ok(())
    }
}
