// Unit tests for the bootstrap handshake

use crate::bootstrap::{KernelBootstrapper, KernelCapabilities, ScriptSource};
use crate::config::{BACKEND_CONNECTION_TIMEOUT_KEY, InterpreterProperties};
use crate::error::bootstrap::BootstrapError;
use crate::template::unresolved_placeholders;
use crate::tests::{SilentKernel, StubKernel};

use common::RedactedSecret;
use models::{BackendInfo, BackendInfoBuilder, ExecuteResponse};

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

fn backend_info() -> BackendInfo {
    BackendInfoBuilder::default()
        .with_port(7077)
        .with_secret(Some(RedactedSecret::new("s3cr3t")))
        .build()
        .unwrap()
}

fn bootstrapper() -> KernelBootstrapper {
    KernelBootstrapper::new(KernelCapabilities::default()).with_lib_path("/opt/R/lib")
}

/// **VALUE**: Verifies a SUCCESS response completes the handshake.
///
/// **WHY THIS MATTERS**: This is the path every session takes; the kernel must receive a
/// fully rendered script carrying the backend port and secret.
///
/// **BUG THIS CATCHES**: Would catch the bundled script gaining a placeholder the context
/// does not fill, or the request being sent unrendered.
#[tokio::test]
async fn given_success_response_when_bootstrap_then_returns_ok() {
    // GIVEN: A kernel that accepts the script
    let kernel = StubKernel::answering(ExecuteResponse::success(""));

    // WHEN: Bootstrapping with default properties
    let result = bootstrapper()
        .bootstrap(&backend_info(), &InterpreterProperties::new(), &kernel)
        .await;

    // THEN: Ok, and exactly one fully rendered script was sent
    assert!(result.is_ok(), "{result:?}");
    let requests = kernel.requests();
    assert_eq!(requests.len(), 1);
    let code = &requests[0].code;
    assert!(unresolved_placeholders(code).is_empty(), "{code}");
    assert!(code.contains("port <- 7077"));
    assert!(code.contains("authSecret <- \"s3cr3t\""));
    assert!(code.contains("timeout <- 6000"));
    assert!(code.contains("libPath <- \"/opt/R/lib\""));
}

/// **VALUE**: Verifies a kernel-side failure surfaces the kernel's own output.
///
/// **WHY THIS MATTERS**: The kernel output (missing SparkR package, refused connection) is
/// the only clue a user has when a session fails to start.
///
/// **BUG THIS CATCHES**: Would catch the error dropping `output`, or an ERROR status being
/// treated as success.
#[tokio::test]
async fn given_error_response_when_bootstrap_then_error_contains_output() {
    // GIVEN: A kernel that fails with "boom"
    let kernel = StubKernel::answering(ExecuteResponse::error("boom"));

    // WHEN: Bootstrapping
    let result = bootstrapper()
        .bootstrap(&backend_info(), &InterpreterProperties::new(), &kernel)
        .await;

    // THEN: Kernel error carrying the output, visible in the message
    let err = result.unwrap_err();
    assert!(err.to_string().contains("boom"), "{err}");
    match err {
        BootstrapError::Kernel { output, .. } => assert_eq!(output, "boom"),
        other => panic!("Expected Kernel error, got {other:?}"),
    }
}

/// **VALUE**: Verifies a malformed timeout fails before anything is sent.
///
/// **WHY THIS MATTERS**: The timeout is inserted into R code verbatim. Sending `"abc"`
/// would fail inside the kernel with a confusing R error instead of a config error.
///
/// **BUG THIS CATCHES**: Would catch parsing happening after the execute call.
#[tokio::test]
async fn given_non_numeric_timeout_when_bootstrap_then_config_error_and_nothing_sent() {
    // GIVEN: A bad timeout property
    let kernel = StubKernel::answering(ExecuteResponse::success(""));
    let properties =
        InterpreterProperties::new().with_property(BACKEND_CONNECTION_TIMEOUT_KEY, "abc");

    // WHEN: Bootstrapping
    let result = bootstrapper()
        .bootstrap(&backend_info(), &properties, &kernel)
        .await;

    // THEN: Config error, kernel untouched
    assert!(matches!(result, Err(BootstrapError::Config { .. })));
    assert!(kernel.requests().is_empty());
}

/// **VALUE**: Verifies the explicit handshake deadline.
///
/// **WHY THIS MATTERS**: Without it a wedged kernel blocks the session's open forever.
///
/// **BUG THIS CATCHES**: Would catch the execute call losing its timeout wrapper.
#[tokio::test(start_paused = true)]
async fn given_silent_kernel_when_bootstrap_then_times_out() {
    // GIVEN: A short connection timeout and a kernel that never answers
    let properties =
        InterpreterProperties::new().with_property(BACKEND_CONNECTION_TIMEOUT_KEY, "1");

    // WHEN: Bootstrapping (paused clock auto-advances to the deadline)
    let result = bootstrapper()
        .bootstrap(&backend_info(), &properties, &SilentKernel)
        .await;

    // THEN: Timeout error
    assert!(matches!(result, Err(BootstrapError::Timeout { .. })));
}

/// **VALUE**: Pins the effective handshake deadline under default properties.
///
/// **WHY THIS MATTERS**: The default timeout is large; operators reading the docs need the
/// real wait time, and a unit change (seconds to milliseconds) would silently shrink it.
///
/// **BUG THIS CATCHES**: Would catch the grace period or the seconds interpretation drifting.
#[test]
fn given_default_properties_when_rendered_then_deadline_is_6030_seconds() {
    let script = bootstrapper()
        .render_script(&backend_info(), &InterpreterProperties::new())
        .unwrap();

    assert_eq!(script.connection_timeout(), Duration::from_secs(6000));
    assert_eq!(script.execute_deadline(), Duration::from_secs(6030));
}

/// **VALUE**: Verifies file templates are rendered the same way as the bundled one.
///
/// **BUG THIS CATCHES**: Would catch `ScriptSource::File` being ignored in favour of the
/// embedded script.
#[test]
fn given_file_script_when_rendered_then_uses_file_contents() {
    // GIVEN: A custom template on disk
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bootstrap.R");
    fs::write(&path, "connect ${Port} secret ${authSecret}").unwrap();

    // WHEN: Rendering with that source
    let script = bootstrapper()
        .with_script_source(ScriptSource::File(path))
        .render_script(&backend_info(), &InterpreterProperties::new())
        .unwrap();

    // THEN: Custom template rendered; log copy hides the secret
    assert_eq!(script.code(), "connect 7077 secret \"s3cr3t\"");
    assert_eq!(script.redacted(), "connect 7077 secret \"[REDACTED]\"");
}

/// **VALUE**: Verifies an unreadable template is an I/O error naming the path.
///
/// **BUG THIS CATCHES**: Would catch a missing file being rendered as an empty script.
#[test]
fn given_missing_script_file_when_rendered_then_resource_error() {
    let missing = PathBuf::from("/nonexistent/ir/bootstrap.R");

    let result = bootstrapper()
        .with_script_source(ScriptSource::File(missing.clone()))
        .render_script(&backend_info(), &InterpreterProperties::new());

    match result {
        Err(BootstrapError::Resource { path, .. }) => assert_eq!(path, missing),
        other => panic!("Expected Resource error, got {other:?}"),
    }
}

#[test]
fn given_spark_capabilities_when_rendered_then_flag_and_version_follow() {
    let capabilities = KernelCapabilities {
        spark_supported: true,
        spark_version: 30000,
        secret_supported: true,
    };

    let script = KernelBootstrapper::new(capabilities)
        .with_lib_path("/spark/R/lib")
        .render_script(&backend_info(), &InterpreterProperties::new())
        .unwrap();

    assert!(script.code().contains("isSparkSupported <- \"true\""));
    assert!(script.code().contains("version <- 30000"));
}
