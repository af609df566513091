// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use jobstat_report::errors::{ConfigError, RunStoreError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for jobstat failures.
pub enum JobstatExitCode {}

impl JobstatExitCode {
    /// Every requested job was analyzed and at least one run was folded.
    pub const OK: i32 = 0;

    /// No runs were folded for any of the requested jobs.
    pub const NO_RUNS_PROCESSED: i32 = 4;

    /// An error occurred while loading configuration or reading the run store.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing the report to stdout failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// The #[error()] strings are placeholders: errors are meant to be printed with
// display_to_stderr, which colorizes them and walks the source chain.

/// An error that jobstat reports to the user and exits on.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config error")]
    ConfigError {
        #[from]
        err: ConfigError,
    },
    #[error("run store error")]
    RunStoreError {
        #[from]
        err: RunStoreError,
    },
    #[error("failed to write output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn write_output(err: impl Into<std::io::Error>) -> Self {
        Self::WriteOutputError { err: err.into() }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. } | Self::RunStoreError { .. } => JobstatExitCode::SETUP_ERROR,
            Self::WriteOutputError { .. } => JobstatExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigError { err } => {
                error!("{err}");
                err.source()
            }
            Self::RunStoreError { err } => {
                error!(
                    "failed to read runs for job `{}` from `{}`",
                    err.job().style(styles.bold),
                    err.path(),
                );
                err.source()
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
