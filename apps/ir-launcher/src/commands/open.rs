use crate::cli::Cli;
use crate::error::LauncherError;

use kernel_core::backend::SparkRBackend;
use kernel_core::config::InterpreterProperties;
use kernel_core::kernel_client::tcp::TcpKernelClient;
use kernel_core::session::IrKernelSession;

use models::BackendInfo;

use std::sync::Arc;

use log::info;

/// Open an IR kernel session against the gateway at `kernel`.
///
/// # Errors
///
/// - [`LauncherError::Core`] with a config error if `zeppelin.r.maxResult` is malformed
/// - [`LauncherError::Core`] with whatever the open sequence failed on
pub async fn open(
    cli: &Cli,
    backend: Arc<SparkRBackend>,
    properties: InterpreterProperties,
    kernel: &str,
) -> Result<BackendInfo, LauncherError> {
    let session = IrKernelSession::new(
        backend,
        properties,
        cli.capabilities(),
        TcpKernelClient::new(kernel),
    )
    .with_bootstrapper(cli.bootstrapper());

    let max_result = session.max_result()?;
    let info = session.open().await?;

    info!(
        "Kernel '{}' at {kernel} ready (max result rows {max_result})",
        session.kernel_name()
    );
    Ok(info)
}
