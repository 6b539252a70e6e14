use crate::error::LauncherError;

use kernel_core::backend::SparkRBackend;

use models::BackendInfo;

use log::info;

/// Start `backend` if no one has yet.
pub async fn serve(
    backend: &SparkRBackend,
    secret_enabled: bool,
) -> Result<BackendInfo, LauncherError> {
    let info = backend.ensure_started(secret_enabled).await?;
    info!("Backend serving on port {}", info.port);
    Ok(info)
}

/// One-line summary of a started backend. The secret is never shown.
pub fn describe(info: &BackendInfo) -> String {
    match &info.secret {
        Some(secret) => format!("backend port={} secret={secret}", info.port),
        None => format!("backend port={} secret=none", info.port),
    }
}
