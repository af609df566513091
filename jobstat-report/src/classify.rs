// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of result labels.

use serde::Serialize;
use std::fmt;

/// The bucket a result label maps to.
///
/// Labels are matched case-sensitively. Both the long-form labels of legacy
/// reports (`Passed`) and the short-form labels of current reports (`PASS`)
/// are accepted where both exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    /// The test was skipped.
    Skip,

    /// The test passed.
    Pass,

    /// The test failed an assertion.
    Failure,

    /// The test failed, and was expected to.
    ExpectedFailure,

    /// The test passed, but was expected to fail.
    UnexpectedPass,

    /// The test errored.
    ///
    /// In a bad run, errors are recorded as spurious instead.
    Error,
}

impl ResultKind {
    /// Maps a trimmed result label to its bucket.
    ///
    /// Returns `None` for labels that aren't recognized.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Skipped" | "SKIP" => Some(Self::Skip),
            "Passed" | "PASS" => Some(Self::Pass),
            "Failure" | "FAIL" => Some(Self::Failure),
            "Expected Failure" => Some(Self::ExpectedFailure),
            "Unexpected Pass" => Some(Self::UnexpectedPass),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns the canonical name of this bucket.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Pass => "pass",
            Self::Failure => "failure",
            Self::ExpectedFailure => "xfail",
            Self::UnexpectedPass => "upass",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
