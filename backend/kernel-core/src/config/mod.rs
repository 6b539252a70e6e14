//! Interpreter properties.
//!
//! A flat string-to-string map, the same shape the host's interpreter
//! settings use. Lookups never fail: absent keys yield the caller's default,
//! and callers parse the string themselves (or use [`InterpreterProperties::get_parsed`]).

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const PROPERTIES_FILE_NAME: &str = "interpreter.toml";

/// Connection timeout handed to the kernel's backend client, in seconds.
pub const BACKEND_CONNECTION_TIMEOUT_KEY: &str = "spark.r.backendConnectionTimeout";
pub const BACKEND_CONNECTION_TIMEOUT_DEFAULT: &str = "6000";

/// Maximum number of rows the result context renders.
pub const MAX_RESULT_KEY: &str = "zeppelin.r.maxResult";
pub const MAX_RESULT_DEFAULT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterProperties {
    #[serde(default)]
    properties: HashMap<String, String>,
}

impl InterpreterProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{config_dir}/interpreter.toml`.
    ///
    /// A missing file yields empty properties (every lookup falls back to its
    /// default). A file that exists but cannot be read or parsed is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(PROPERTIES_FILE_NAME);

        if !path.exists() {
            info!(
                "Properties file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        let properties: InterpreterProperties =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            "Loaded {} interpreter properties from {}",
            properties.len(),
            path.display()
        );
        Ok(properties)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Look up `name`, falling back to `default` when absent.
    pub fn get(&self, name: &str, default: &str) -> String {
        match self.properties.get(name) {
            Some(value) => value.clone(),
            None => {
                debug!("Property {name} not set, using default {default:?}");
                default.to_string()
            }
        }
    }

    /// Look up and parse `name`, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the property is set but does not parse.
    #[track_caller]
    pub fn get_parsed<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.properties.get(name) else {
            return Ok(default);
        };

        raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            location: ErrorLocation::from(Location::caller()),
            key: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl FromIterator<(String, String)> for InterpreterProperties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}
