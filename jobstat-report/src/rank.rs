// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking tests by failure rate once all runs have been folded.

use crate::{
    aggregate::{JobSummary, TestStats},
    date_range::DateRange,
    display::{DisplayRankedSummary, NameStyle, Styles},
};
use serde::Serialize;

/// A test's counters along with its failure percentage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RankedTest {
    /// The test's counters.
    #[serde(flatten)]
    pub stats: TestStats,

    /// The truncated percentage of classified results that were failures or
    /// errors.
    pub failure_percent: usize,
}

/// The final report for a job: every test that ran at least once, ordered by
/// ascending failure percentage.
///
/// Tests with equal failure percentages keep the order in which they were
/// first seen. There is no secondary sort key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RankedSummary {
    /// The name of the job.
    pub job_name: String,

    /// The number of runs folded into the summary.
    pub runs_processed: usize,

    /// The ranked tests.
    pub tests: Vec<RankedTest>,
}

impl RankedSummary {
    /// Ranks the tests of a fully-folded job summary.
    ///
    /// Tests that were skipped in every run they appeared in are dropped, since
    /// they carry no signal.
    pub fn new(summary: JobSummary) -> Self {
        let (job_name, runs_processed, mut tests) = summary.into_tests();

        tests.retain(|_, stats| !stats.never_ran());

        let mut tests: Vec<_> = tests
            .into_values()
            .filter_map(|stats| {
                // never_ran() is false, so there is at least one classified result.
                let failure_percent = stats.failure_percent()?;
                Some(RankedTest {
                    stats,
                    failure_percent,
                })
            })
            .collect();

        // This is a stable sort.
        tests.sort_by_key(|test| test.failure_percent);

        Self {
            job_name,
            runs_processed,
            tests,
        }
    }

    /// Returns a display wrapper for the human-readable report.
    pub fn display<'a>(
        &'a self,
        date_range: &'a DateRange,
        name_style: NameStyle,
        styles: &'a Styles,
    ) -> DisplayRankedSummary<'a> {
        DisplayRankedSummary::new(self, date_range, name_style, styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::{AnalysisOptions, Aggregator, RunDocument},
        events::test_helpers::RecordingEvents,
        parse::test_helpers::current_document,
    };
    use pretty_assertions::assert_eq;

    fn ranked(runs: &[&[(&str, &str)]]) -> RankedSummary {
        let mut aggregator =
            Aggregator::new("job", AnalysisOptions::default(), RecordingEvents::default());
        for (index, rows) in runs.iter().enumerate() {
            aggregator.add_run(&RunDocument::new(index.to_string(), current_document(rows)));
        }
        RankedSummary::new(aggregator.finish())
    }

    fn order(summary: &RankedSummary) -> Vec<(&str, usize)> {
        summary
            .tests
            .iter()
            .map(|test| (test.stats.identity.as_str(), test.failure_percent))
            .collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let summary = ranked(&[
            &[("Error", "a"), ("Error", "a"), ("PASS", "b"), ("PASS", "b")],
            &[("Failure", "a"), ("PASS", "b")],
        ]);
        assert_eq!(summary.runs_processed, 2);
        assert_eq!(order(&summary), vec![("b", 0), ("a", 33)]);

        let a = &summary.tests[1].stats;
        assert_eq!((a.errors, a.spurious, a.failures, a.observed), (0, 2, 1, 3));
        let b = &summary.tests[0].stats;
        assert_eq!((b.passes, b.observed), (3, 3));
    }

    #[test]
    fn skip_only_tests_are_dropped() {
        let summary = ranked(&[
            &[("SKIP", "skipped"), ("PASS", "ran"), ("SKIP", "once")],
            &[("Skipped", "skipped"), ("PASS", "ran"), ("FAIL", "once")],
        ]);
        assert_eq!(order(&summary), vec![("ran", 0), ("once", 50)]);
    }

    #[test]
    fn unknown_only_tests_are_dropped() {
        let summary = ranked(&[&[("Blorked", "x"), ("PASS", "y")]]);
        assert_eq!(order(&summary), vec![("y", 0)]);
    }

    #[test]
    fn failure_percent_truncates() {
        let summary = ranked(&[
            &[("FAIL", "t")],
            &[("PASS", "t")],
            &[("PASS", "t")],
            &[("FAIL", "u")],
            &[("FAIL", "u")],
            &[("PASS", "u")],
        ]);
        assert_eq!(order(&summary), vec![("t", 33), ("u", 66)]);
    }

    #[test]
    fn ties_keep_first_sighting_order() {
        let summary = ranked(&[
            &[("FAIL", "z"), ("PASS", "y"), ("FAIL", "x"), ("PASS", "w")],
            &[("PASS", "z"), ("PASS", "y"), ("PASS", "x"), ("PASS", "w")],
        ]);
        assert_eq!(
            order(&summary),
            vec![("y", 0), ("w", 0), ("z", 50), ("x", 50)]
        );
    }

    #[test]
    fn no_runs_yields_empty_ranking() {
        let summary = ranked(&[]);
        assert_eq!(summary.runs_processed, 0);
        assert!(summary.tests.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let summary = ranked(&[&[("PASS", "a"), ("FAIL", "b")]]);
        let json = serde_json::to_value(&summary).expect("serialization succeeds");
        assert_eq!(json["job-name"], "job");
        assert_eq!(json["runs-processed"], 1);
        assert_eq!(json["tests"][1]["identity"], "b");
        assert_eq!(json["tests"][1]["failures"], 1);
        assert_eq!(json["tests"][1]["failure-percent"], 100);
    }
}
