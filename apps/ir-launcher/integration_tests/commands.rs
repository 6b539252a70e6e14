use crate::helpers::spawn_gateway;

use ir_launcher::cli::Cli;
use ir_launcher::commands::{open, render, serve};
use ir_launcher::error::LauncherError;

use kernel_core::backend::SparkRBackend;
use kernel_core::config::InterpreterProperties;
use kernel_core::error::CoreError;

use models::ExecuteResponse;

use std::fs::write;
use std::sync::Arc;

use clap::Parser;

// ============================================================================
// Integration tests for launcher commands
// Commands run against real kernel-core pieces with a fake kernel gateway
// ============================================================================

/// **VALUE**: Verifies `render` fills every placeholder and never prints the secret.
///
/// **WHY THIS MATTERS**: Users paste this output into bug reports.
///
/// **BUG THIS CATCHES**: Would catch `render` printing the live script instead of the
/// redacted one.
#[test]
fn given_render_when_run_then_script_is_complete_and_redacted() {
    // GIVEN
    let cli = Cli::try_parse_from(["ir-launcher", "render", "--port", "7123"]).unwrap();

    // WHEN
    let script = render::render(&cli, &InterpreterProperties::new(), 7123).unwrap();

    // THEN
    assert!(script.contains("7123"));
    assert!(script.contains("[REDACTED]"));
    assert!(!script.contains("${"), "{script}");
}

#[test]
fn given_script_override_when_rendered_then_override_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("custom.R");
    write(&script_path, "connect(${Port}, ${authSecret}, ${timeout})").unwrap();

    let cli = Cli::try_parse_from([
        "ir-launcher",
        "render",
        "--no-secret",
        "--script",
        script_path.to_str().unwrap(),
    ])
    .unwrap();
    let properties =
        InterpreterProperties::new().with_property("spark.r.backendConnectionTimeout", "45");

    let script = render::render(&cli, &properties, 7077).unwrap();

    assert_eq!(script, r#"connect(7077, "", 45)"#);
}

#[test]
fn given_render_with_zero_port_when_run_then_launcher_error() {
    let cli = Cli::try_parse_from(["ir-launcher", "render"]).unwrap();

    let result = render::render(&cli, &InterpreterProperties::new(), 0);

    assert!(matches!(result, Err(LauncherError::Launcher { .. })));
}

/// **VALUE**: Verifies `serve` is idempotent and its summary hides the secret.
///
/// **BUG THIS CATCHES**: Would catch a second `serve` on the same backend rebinding.
#[tokio::test]
async fn given_backend_when_served_twice_then_same_port_and_secret_hidden() {
    // GIVEN
    let backend = SparkRBackend::new();

    // WHEN
    let first = serve::serve(&backend, true).await.unwrap();
    let second = serve::serve(&backend, true).await.unwrap();

    // THEN
    assert_eq!(first.port, second.port);
    let summary = serve::describe(&first);
    assert!(summary.contains(&first.port.to_string()));
    assert!(!summary.contains(first.secret_value()));
    assert!(summary.contains("[REDACTED]"));
}

/// **VALUE**: Verifies `open` drives the full open sequence through the TCP client.
///
/// **WHY THIS MATTERS**: This is the path the binary takes for `open --kernel`.
///
/// **BUG THIS CATCHES**: Would catch CLI capabilities not reaching the session.
#[tokio::test]
async fn given_successful_gateway_when_opened_then_backend_info_returned() {
    // GIVEN: A gateway that accepts any script
    let gateway = spawn_gateway(ExecuteResponse::success("ok")).await;
    let kernel = gateway.to_string();
    let cli = Cli::try_parse_from([
        "ir-launcher",
        "open",
        "--kernel",
        kernel.as_str(),
        "--no-secret",
    ])
    .unwrap();
    let backend = Arc::new(SparkRBackend::new());

    // WHEN
    let info = open::open(&cli, Arc::clone(&backend), InterpreterProperties::new(), &kernel)
        .await
        .unwrap();

    // THEN: Backend started without a secret
    assert!(backend.is_started());
    assert_eq!(Some(info.port), backend.port());
    assert!(info.secret.is_none());
}

#[tokio::test]
async fn given_failing_gateway_when_opened_then_core_bootstrap_error() {
    let gateway = spawn_gateway(ExecuteResponse::error("boom")).await;
    let kernel = gateway.to_string();
    let cli = Cli::try_parse_from(["ir-launcher", "open", "--kernel", kernel.as_str()]).unwrap();

    let result = open::open(
        &cli,
        Arc::new(SparkRBackend::new()),
        InterpreterProperties::new(),
        &kernel,
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, LauncherError::Core(CoreError::Bootstrap(_))));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn given_malformed_max_result_when_opened_then_config_error_before_backend_starts() {
    let cli = Cli::try_parse_from(["ir-launcher", "open", "--kernel", "127.0.0.1:1"]).unwrap();
    let backend = Arc::new(SparkRBackend::new());
    let properties = InterpreterProperties::new().with_property("zeppelin.r.maxResult", "lots");

    let result = open::open(&cli, Arc::clone(&backend), properties, "127.0.0.1:1").await;

    assert!(matches!(
        result,
        Err(LauncherError::Core(CoreError::Config(_)))
    ));
    assert!(!backend.is_started());
}
