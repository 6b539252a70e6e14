// Unit tests for bootstrap placeholder values

use crate::bootstrap::KernelCapabilities;
use crate::bootstrap::context::{
    AUTH_SECRET_PLACEHOLDER, BootstrapScriptContext, LIB_PATH_PLACEHOLDER, PORT_PLACEHOLDER,
    SPARK_SUPPORTED_PLACEHOLDER, TIMEOUT_PLACEHOLDER, VERSION_PLACEHOLDER, r_string,
};

use common::RedactedSecret;
use models::BackendInfoBuilder;

use std::path::Path;

/// **VALUE**: Verifies value formatting per placeholder.
///
/// **WHY THIS MATTERS**: The script assigns these directly to R variables. Numbers must be
/// bare, strings must be quoted, or the kernel fails with a syntax error.
///
/// **BUG THIS CATCHES**: Would catch quoting the port or forgetting to quote the secret.
#[test]
fn given_backend_and_capabilities_when_context_built_then_values_formatted_for_r() {
    // GIVEN: A started backend with a secret and default capabilities
    let backend = BackendInfoBuilder::default()
        .with_port(7077)
        .with_secret(Some(RedactedSecret::new("xyz")))
        .build()
        .unwrap();
    let capabilities = KernelCapabilities::default();

    // WHEN: Building the context
    let context =
        BootstrapScriptContext::new(&backend, &capabilities, Path::new("/opt/R/lib"), "6000");
    let values = context.substitutions();

    // THEN: All six placeholders have R-ready values
    assert_eq!(values.len(), 6);
    assert_eq!(values[PORT_PLACEHOLDER], "7077");
    assert_eq!(values[VERSION_PLACEHOLDER], "20403");
    assert_eq!(values[LIB_PATH_PLACEHOLDER], "\"/opt/R/lib\"");
    assert_eq!(values[TIMEOUT_PLACEHOLDER], "6000");
    assert_eq!(values[SPARK_SUPPORTED_PLACEHOLDER], "\"false\"");
    assert_eq!(values[AUTH_SECRET_PLACEHOLDER], "\"xyz\"");
}

/// **VALUE**: Verifies the log copy masks the secret and nothing else.
///
/// **BUG THIS CATCHES**: Would catch the bootstrap log line leaking the backend secret.
#[test]
fn given_context_when_redacted_then_only_secret_is_masked() {
    let backend = BackendInfoBuilder::default()
        .with_port(7077)
        .with_secret(Some(RedactedSecret::new("xyz")))
        .build()
        .unwrap();
    let context = BootstrapScriptContext::new(
        &backend,
        &KernelCapabilities::default(),
        Path::new("/lib"),
        "1",
    );

    let redacted = context.redacted();

    assert_eq!(redacted[AUTH_SECRET_PLACEHOLDER], "\"[REDACTED]\"");
    assert_eq!(redacted[PORT_PLACEHOLDER], "7077");
    assert!(!redacted.values().any(|v| v.contains("xyz")));
}

#[test]
fn given_no_secret_when_redacted_then_secret_stays_empty() {
    let backend = BackendInfoBuilder::default().with_port(7077).build().unwrap();
    let context = BootstrapScriptContext::new(
        &backend,
        &KernelCapabilities::default(),
        Path::new("/lib"),
        "1",
    );

    assert_eq!(context.redacted()[AUTH_SECRET_PLACEHOLDER], "\"\"");
}

/// **VALUE**: Verifies Windows-style paths survive as R string literals.
///
/// **BUG THIS CATCHES**: Would catch `C:\R\lib` being emitted unescaped, which R parses
/// as invalid escape sequences.
#[test]
fn given_backslashes_and_quotes_when_quoted_then_escaped() {
    assert_eq!(r_string(r"C:\R\lib"), r#""C:\\R\\lib""#);
    assert_eq!(r_string(r#"a"b"#), r#""a\"b""#);
}
