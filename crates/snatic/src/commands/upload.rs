//! `snatic upload` command implementation.

use std::path::Path;

use snatic_config::ProjectLayout;
use snatic_deploy::MirrorUploader;

use super::resolve_layout;
use crate::error::CliError;
use crate::output::Output;

pub(crate) fn execute(root: Option<&Path>) -> Result<(), CliError> {
    let layout = resolve_layout(root)?;
    run(&layout, &Output::new())
}

/// Mirror the built site to the target in `data/upload.yaml`.
pub(crate) fn run(layout: &ProjectLayout, output: &Output) -> Result<(), CliError> {
    output.step("Uploading site...");

    let report = MirrorUploader::sftp().upload(layout)?;

    output.upload_report(&report);
    Ok(())
}
