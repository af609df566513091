// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for jobstat.
//!
//! Configuration is layered. Built-in defaults come from an embedded
//! `default-config.toml`, and any value set in a config file overrides the
//! corresponding default. Command-line flags are applied on top of the result
//! by the caller.

use crate::{bad_run::BadRunThreshold, errors::ConfigError};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, io};
use tracing::{debug, warn};

/// The name of the config file looked up in the run store directory.
pub const CONFIG_FILE_NAME: &str = "jobstat.toml";

/// Special value for `--config-file` that skips config file loading entirely.
pub const CONFIG_NONE: &str = "none";

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigLocation<'a> {
    /// Load `jobstat.toml` from the run store directory if it exists, and use
    /// the built-in defaults otherwise.
    Default {
        /// The run store directory.
        store_dir: &'a Utf8Path,
    },

    /// Skip config files entirely, using only built-in defaults.
    Isolated,

    /// Load configuration from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl<'a> ConfigLocation<'a> {
    /// Creates a config location from the `--config-file` argument, if any.
    ///
    /// Returns `Isolated` if the argument is `"none"`.
    pub fn from_cli(config_file: Option<&'a str>, store_dir: &'a Utf8Path) -> Self {
        match config_file {
            None => Self::Default { store_dir },
            Some(s) if s == CONFIG_NONE => Self::Isolated,
            Some(s) => Self::Explicit(Utf8Path::new(s)),
        }
    }
}

/// Resolved jobstat configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobstatConfig {
    /// Settings that control how runs are folded.
    pub analysis: AnalysisConfig,

    /// Settings for the on-disk run store.
    pub store: StoreConfig,
}

/// The `[analysis]` section of the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Runs with an error fraction above this threshold are bad runs.
    pub bad_run_threshold: BadRunThreshold,
}

/// The `[store]` section of the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// The file name of the result document within each build directory.
    pub report_file_name: String,
}

impl JobstatConfig {
    /// The embedded default configuration.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Loads and resolves configuration from the given location.
    pub fn from_location(location: ConfigLocation<'_>) -> Result<Self, ConfigError> {
        Self::from_location_with_warnings(location, &mut DefaultConfigWarnings)
    }

    /// Returns the built-in default configuration.
    pub fn defaults() -> Self {
        Self::resolve(DefaultConfig::from_embedded(), DeserializedConfig::default())
            .expect("embedded default config should have valid values")
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|error| ConfigError::Serialize { error })
    }

    fn from_location_with_warnings(
        location: ConfigLocation<'_>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        let config = match location {
            ConfigLocation::Default { store_dir } => {
                let path = default_config_path(store_dir);
                DeserializedConfig::from_path_with_warnings(&path, warnings)?
            }
            ConfigLocation::Isolated => {
                debug!("config: skipping config files, using built-in defaults");
                None
            }
            ConfigLocation::Explicit(path) => {
                match DeserializedConfig::from_path_with_warnings(path, warnings)? {
                    Some(config) => Some(config),
                    None => {
                        return Err(ConfigError::FileNotFound {
                            path: path.to_owned(),
                        });
                    }
                }
            }
        };

        Self::resolve(DefaultConfig::from_embedded(), config.unwrap_or_default())
    }

    fn resolve(defaults: DefaultConfig, config: DeserializedConfig) -> Result<Self, ConfigError> {
        let bad_run_threshold = BadRunThreshold::new(
            config
                .analysis
                .bad_run_threshold
                .unwrap_or(defaults.analysis.bad_run_threshold),
        )?;

        let report_file_name = config
            .store
            .report_file_name
            .unwrap_or(defaults.store.report_file_name);
        validate_report_file_name(&report_file_name)?;

        Ok(Self {
            analysis: AnalysisConfig { bad_run_threshold },
            store: StoreConfig { report_file_name },
        })
    }
}

/// Checks that `name` is a single path component.
pub fn validate_report_file_name(name: &str) -> Result<(), ConfigError> {
    let mut components = Utf8Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(camino::Utf8Component::Normal(component)), None) if component == name => Ok(()),
        _ => Err(ConfigError::InvalidReportFileName {
            value: name.to_owned(),
        }),
    }
}

/// Receives warnings produced while loading configuration.
trait ConfigWarnings {
    /// Unknown keys were found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs config warnings through `tracing`.
struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if let [key] = unknown.iter().collect::<Vec<_>>().as_slice() {
            unknown_str.push_str("key: ");
            unknown_str.push_str(key);
        } else {
            unknown_str.push_str("keys:\n");
            for key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(key);
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

/// Configuration as read from a file, where every value is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedConfig {
    #[serde(default)]
    analysis: DeserializedAnalysisConfig,

    #[serde(default)]
    store: DeserializedStoreConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedAnalysisConfig {
    bad_run_threshold: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedStoreConfig {
    report_file_name: Option<String>,
}

impl DeserializedConfig {
    /// Loads config from `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigError> {
        debug!("config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }

    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: DeserializedConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }
}

/// The embedded defaults, where every value is required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultConfig {
    analysis: DefaultAnalysisConfig,
    store: DefaultStoreConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultAnalysisConfig {
    bad_run_threshold: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultStoreConfig {
    report_file_name: String,
}

impl DefaultConfig {
    /// Parses the embedded default config.
    ///
    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let deserializer = toml::Deserializer::parse(JobstatConfig::DEFAULT_CONFIG)
            .expect("embedded default config should parse");
        let mut unknown = BTreeSet::new();
        let config: DefaultConfig =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .expect("embedded default config should be valid");

        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        config
    }
}

/// Returns the path to the config file in `store_dir`.
pub fn default_config_path(store_dir: &Utf8Path) -> Utf8PathBuf {
    store_dir.join(CONFIG_FILE_NAME)
}
