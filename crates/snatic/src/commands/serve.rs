//! `snatic serve` command implementation.

use std::path::Path;

use clap::Args;

use super::resolve_layout;
use crate::error::CliError;
use crate::output::Output;
use crate::php;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Host to bind to.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,
}

impl ServeArgs {
    /// Serve the built site with PHP's development server.
    pub(crate) fn execute(&self, root: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        let layout = resolve_layout(root)?;
        let document_root = layout.output_dir();
        if !document_root.is_dir() {
            return Err(CliError::Requirement(format!(
                "Site not built: {} does not exist. Run `snatic build` first.",
                document_root.display()
            )));
        }

        let address = format!("{}:{}", self.host, self.port);
        output.success(&format!("Development server running -> http://{address}"));
        php::serve(&address, &document_root)
    }
}
