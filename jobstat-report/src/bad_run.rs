// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection of bad runs.
//!
//! A run in which a large share of tests errored most likely hit an
//! infrastructure problem rather than a set of regressions. Errors from such a
//! run are recorded as spurious so they don't skew long-term failure rates.
//! The decision is made per run, from that run's results alone.

use crate::{classify::ResultKind, errors::ConfigError};
use serde::{Serialize, Serializer};
use std::fmt;

/// The error fraction above which a run is considered bad.
///
/// The comparison is strict: a run whose error fraction equals the threshold
/// is not bad.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct BadRunThreshold(f64);

impl BadRunThreshold {
    /// The default threshold: more than a quarter of results errored.
    pub const DEFAULT: Self = Self(0.25);

    /// Creates a new threshold, which must be in `[0, 1)`.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if (0.0..1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidBadRunThreshold { value })
        }
    }

    /// Returns the threshold as a fraction.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for BadRunThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BadRunThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BadRunThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// The error statistics of a single run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunHealth {
    errors: usize,
    total: usize,
    bad: bool,
}

impl RunHealth {
    /// Assesses a run from the classification of each of its results.
    ///
    /// `None` entries are results with unrecognized labels; they count toward
    /// the total but are never errors.
    ///
    /// Returns `None` if the run has no results, in which case there is no
    /// error fraction to speak of and the run must be discarded.
    pub fn assess(
        kinds: impl IntoIterator<Item = Option<ResultKind>>,
        threshold: BadRunThreshold,
    ) -> Option<Self> {
        let (errors, total) = kinds.into_iter().fold((0, 0), |(errors, total), kind| {
            let is_error = kind == Some(ResultKind::Error);
            (errors + usize::from(is_error), total + 1)
        });
        if total == 0 {
            return None;
        }

        let bad = errors as f64 / total as f64 > threshold.value();
        Some(Self { errors, total, bad })
    }

    /// Returns the number of results that errored.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Returns the number of results in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the percentage of results that errored.
    pub fn error_percent(&self) -> f64 {
        100.0 * self.errors as f64 / self.total as f64
    }

    /// Returns true if errors in this run should be recorded as spurious.
    pub fn is_bad(&self) -> bool {
        self.bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter;
    use test_case::test_case;

    fn run_with(errors: usize, passes: usize) -> Vec<Option<ResultKind>> {
        iter::repeat_n(Some(ResultKind::Error), errors)
            .chain(iter::repeat_n(Some(ResultKind::Pass), passes))
            .collect()
    }

    #[test_case(25, 75, false; "exactly a quarter")]
    #[test_case(26, 74, true; "just over a quarter")]
    #[test_case(0, 10, false; "no errors")]
    #[test_case(10, 0, true; "all errors")]
    #[test_case(1, 3, false; "one in four")]
    #[test_case(2, 2, true; "half")]
    fn default_threshold(errors: usize, passes: usize, bad: bool) {
        let health = RunHealth::assess(run_with(errors, passes), BadRunThreshold::DEFAULT)
            .expect("run is non-empty");
        assert_eq!(health.errors(), errors);
        assert_eq!(health.total(), errors + passes);
        assert_eq!(health.is_bad(), bad);
    }

    #[test]
    fn unknown_labels_count_toward_total() {
        let kinds = vec![Some(ResultKind::Error), None, None, None];
        let health = RunHealth::assess(kinds, BadRunThreshold::DEFAULT).expect("run is non-empty");
        assert_eq!(health.total(), 4);
        assert!(!health.is_bad());
        assert_eq!(health.error_percent(), 25.0);
    }

    #[test]
    fn empty_run_is_not_assessed() {
        assert_eq!(RunHealth::assess(Vec::new(), BadRunThreshold::DEFAULT), None);
    }

    #[test]
    fn custom_threshold() {
        let threshold = BadRunThreshold::new(0.5).expect("threshold is valid");
        let health = RunHealth::assess(run_with(2, 2), threshold).expect("run is non-empty");
        assert!(!health.is_bad());

        let threshold = BadRunThreshold::new(0.0).expect("threshold is valid");
        let health = RunHealth::assess(run_with(1, 99), threshold).expect("run is non-empty");
        assert!(health.is_bad());
    }

    #[test_case(-0.1; "negative")]
    #[test_case(1.0; "one")]
    #[test_case(f64::NAN; "nan")]
    fn invalid_threshold(value: f64) {
        BadRunThreshold::new(value).expect_err("threshold is invalid");
    }
}
