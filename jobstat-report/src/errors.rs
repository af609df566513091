// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by jobstat.
//!
//! Problems with individual runs (empty documents, missing dates, unknown
//! result labels) are not errors: they are reported through
//! [`AnalysisEvents`](crate::events::AnalysisEvents) and the run or result is
//! excluded.

use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use thiserror::Error;

/// An error that occurred while parsing a date bound such as `--from`.
#[derive(Clone, Debug, Error)]
#[error(
    "invalid date bound `{input}`\n\
     (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS, or an RFC 3339 timestamp)"
)]
pub struct DateBoundParseError {
    input: String,
}

impl DateBoundParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An error that occurred while loading jobstat configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file at `{path}`")]
    Read {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found at `{path}`")]
    FileNotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },

    /// The config file could not be parsed as TOML.
    #[error("failed to parse config file at `{path}`")]
    Parse {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },

    /// The bad-run threshold is outside `[0, 1)`.
    #[error("bad-run threshold {value} is invalid (must be at least 0 and less than 1)")]
    InvalidBadRunThreshold {
        /// The value that was provided.
        value: f64,
    },

    /// The resolved configuration could not be rendered as TOML.
    #[error("failed to serialize configuration")]
    Serialize {
        /// The underlying error.
        #[source]
        error: toml::ser::Error,
    },

    /// The report file name is empty or contains a path separator.
    #[error("report file name `{value}` is invalid (must be a plain, non-empty file name)")]
    InvalidReportFileName {
        /// The value that was provided.
        value: String,
    },
}

/// An error that occurred while listing the runs of a job.
#[derive(Debug, Error)]
#[error("failed to read runs for job `{job}` from `{path}`")]
pub struct RunStoreError {
    job: String,
    path: Utf8PathBuf,
    #[source]
    error: io::Error,
}

impl RunStoreError {
    pub(crate) fn new(
        job: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
        error: io::Error,
    ) -> Self {
        Self {
            job: job.into(),
            path: path.into(),
            error,
        }
    }

    /// Returns the name of the job whose runs could not be listed.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Returns the job directory that could not be read.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
