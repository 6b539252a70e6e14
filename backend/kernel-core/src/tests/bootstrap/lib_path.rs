// Unit tests for SparkR library path resolution

use crate::bootstrap::lib_path::{
    SPARK_HOME_ENV, ZEPPELIN_HOME_ENV, resolve_sparkr_lib, resolve_sparkr_lib_with,
};

use std::env;
use std::path::PathBuf;

use serial_test::serial;

/// **VALUE**: Verifies Spark-backed kernels load SparkR from the Spark installation.
///
/// **WHY THIS MATTERS**: The R package version must match the JVM side it talks to.
///
/// **BUG THIS CATCHES**: Would catch the branches being swapped.
#[test]
fn given_spark_supported_with_spark_home_when_resolved_then_uses_spark_home() {
    let path = resolve_sparkr_lib_with(true, Some("/opt/spark"), Some("/opt/zeppelin"));

    assert_eq!(path, PathBuf::from("/opt/spark/R/lib"));
}

/// **VALUE**: Verifies plain IR kernels ignore `SPARK_HOME`.
///
/// **BUG THIS CATCHES**: Would catch a plain kernel picking up an unrelated Spark install.
#[test]
fn given_spark_unsupported_when_resolved_then_uses_zeppelin_home() {
    let path = resolve_sparkr_lib_with(false, Some("/opt/spark"), Some("/opt/zeppelin"));

    assert_eq!(path, PathBuf::from("/opt/zeppelin/interpreter/r/R/lib"));
}

#[test]
fn given_no_homes_when_resolved_then_uses_relative_default() {
    let path = resolve_sparkr_lib_with(true, None, Some(""));

    assert_eq!(path, PathBuf::from("interpreter/r/R/lib"));
}

/// **VALUE**: Verifies the env-reading entry point picks up `SPARK_HOME`/`ZEPPELIN_HOME`.
///
/// **BUG THIS CATCHES**: Would catch the env variable names drifting from what
/// installations actually export.
#[test]
#[serial]
#[allow(unsafe_code)]
fn given_homes_in_environment_when_resolved_then_env_values_used() {
    // SERIAL TEST: Modifies process environment
    unsafe { env::set_var(SPARK_HOME_ENV, "/env/spark") };
    unsafe { env::set_var(ZEPPELIN_HOME_ENV, "/env/zeppelin") };

    assert_eq!(resolve_sparkr_lib(true), PathBuf::from("/env/spark/R/lib"));
    assert_eq!(
        resolve_sparkr_lib(false),
        PathBuf::from("/env/zeppelin/interpreter/r/R/lib")
    );

    unsafe { env::remove_var(SPARK_HOME_ENV) };
    unsafe { env::remove_var(ZEPPELIN_HOME_ENV) };
}
