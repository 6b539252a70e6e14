use crate::cli::Cli;
use crate::error::LauncherError;

use kernel_core::config::InterpreterProperties;

use common::{ErrorLocation, RedactedSecret};

use models::BackendInfoBuilder;

use std::panic::Location;

use log::debug;
use uuid::Uuid;

/// Render the bootstrap script against a backend that is never started.
///
/// The secret is generated but printed redacted, so the output is safe to share.
pub fn render(
    cli: &Cli,
    properties: &InterpreterProperties,
    port: u16,
) -> Result<String, LauncherError> {
    let secret = cli
        .capabilities()
        .secret_supported
        .then(|| RedactedSecret::new(Uuid::new_v4().simple().to_string()));

    let backend = BackendInfoBuilder::default()
        .with_port(port)
        .with_secret(secret)
        .build()
        .map_err(|e| LauncherError::Launcher {
            message: format!("Invalid placeholder backend: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let script = cli.bootstrapper().render_script(&backend, properties)?;
    debug!(
        "Rendered bootstrap script ({} bytes, timeout {:?})",
        script.code().len(),
        script.connection_timeout()
    );

    Ok(script.redacted().to_string())
}
