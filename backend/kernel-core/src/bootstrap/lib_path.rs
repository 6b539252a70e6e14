//! Where the kernel finds the SparkR package.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

pub const SPARK_HOME_ENV: &str = "SPARK_HOME";
pub const ZEPPELIN_HOME_ENV: &str = "ZEPPELIN_HOME";

const SPARK_R_LIB: &str = "R/lib";
const INTERPRETER_R_LIB: &str = "interpreter/r/R/lib";

/// Resolve the SparkR library directory from the process environment.
///
/// See [`resolve_sparkr_lib_with`] for the resolution order.
pub fn resolve_sparkr_lib(spark_supported: bool) -> PathBuf {
    resolve_sparkr_lib_with(
        spark_supported,
        env::var(SPARK_HOME_ENV).ok().as_deref(),
        env::var(ZEPPELIN_HOME_ENV).ok().as_deref(),
    )
}

/// Resolution order:
///
/// 1. `spark_supported` and `SPARK_HOME` set: `$SPARK_HOME/R/lib`
/// 2. `ZEPPELIN_HOME` set: `$ZEPPELIN_HOME/interpreter/r/R/lib`
/// 3. `interpreter/r/R/lib` relative to the working directory
pub fn resolve_sparkr_lib_with(
    spark_supported: bool,
    spark_home: Option<&str>,
    zeppelin_home: Option<&str>,
) -> PathBuf {
    let spark_home = spark_home.filter(|s| !s.is_empty());
    let zeppelin_home = zeppelin_home.filter(|s| !s.is_empty());

    let path = match (spark_supported, spark_home, zeppelin_home) {
        (true, Some(spark_home), _) => Path::new(spark_home).join(SPARK_R_LIB),
        (_, _, Some(zeppelin_home)) => Path::new(zeppelin_home).join(INTERPRETER_R_LIB),
        _ => PathBuf::from(INTERPRETER_R_LIB),
    };

    debug!(
        "Resolved SparkR lib path {} (spark_supported={spark_supported})",
        path.display()
    );
    path
}
