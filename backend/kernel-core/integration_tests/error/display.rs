use kernel_core::backend::SparkRBackend;
use kernel_core::bootstrap::{KernelBootstrapper, KernelCapabilities};
use kernel_core::config::{BACKEND_CONNECTION_TIMEOUT_KEY, InterpreterProperties};
use kernel_core::error::bootstrap::BootstrapError;
use kernel_core::error::config::ConfigError;
use kernel_core::kernel_client::tcp::TcpKernelClient;

use crate::helpers::spawn_gateway;

use models::ExecuteResponse;

/// **VALUE**: Verifies bootstrap error text carries the kernel output and a source location.
///
/// **WHY THIS MATTERS**: This text is what lands in the host's log when a session fails.
///
/// **BUG THIS CATCHES**: Would catch the Display format dropping the output or location.
#[tokio::test]
async fn given_kernel_error_when_displayed_then_contains_output_and_location() {
    // GIVEN: A started backend and a gateway answering ERROR "boom"
    let backend = SparkRBackend::new();
    let info = backend.ensure_started(true).await.unwrap();
    let gateway = spawn_gateway(|_| ExecuteResponse::error("boom")).await;
    let client = TcpKernelClient::new(gateway.to_string());

    // WHEN: Bootstrapping
    let error = KernelBootstrapper::new(KernelCapabilities::default())
        .bootstrap(&info, &InterpreterProperties::new(), &client)
        .await
        .unwrap_err();

    // THEN: Display has the output and a `[file:line:col]` location
    let text = error.to_string();
    assert!(text.contains("boom"), "{text}");
    assert!(text.contains(".rs:"), "{text}");
}

/// **VALUE**: Verifies a malformed timeout is reported as a config problem naming the key.
///
/// **BUG THIS CATCHES**: Would catch a bad property silently falling back to a default.
#[tokio::test]
async fn given_malformed_timeout_when_bootstrapping_then_config_error_names_key() {
    let backend = SparkRBackend::new();
    let info = backend.ensure_started(false).await.unwrap();
    let gateway = spawn_gateway(|_| ExecuteResponse::success("")).await;
    let client = TcpKernelClient::new(gateway.to_string());
    let properties =
        InterpreterProperties::new().with_property(BACKEND_CONNECTION_TIMEOUT_KEY, "soon");

    let error = KernelBootstrapper::new(KernelCapabilities::default())
        .bootstrap(&info, &properties, &client)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        BootstrapError::Config {
            source: ConfigError::InvalidValue { .. },
            ..
        }
    ));
    assert!(error.to_string().contains(BACKEND_CONNECTION_TIMEOUT_KEY));
}
