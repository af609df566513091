// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding run documents into per-test counters.
//!
//! Each run is either folded in completely or skipped completely: the checks
//! that can exclude a run (no rows, no date, outside the date range) all happen
//! before any counter is touched. Folding a run only ever increments counters,
//! so the final counts don't depend on the order in which runs are added, and
//! partial summaries built from disjoint sets of runs can be combined with
//! [`JobSummary::merge`].

use crate::{
    bad_run::{BadRunThreshold, RunHealth},
    classify::ResultKind,
    date_range::{DateRange, parse_report_date},
    events::AnalysisEvents,
    parse::{ResultTable, generated_on},
};
use indexmap::IndexMap;
use serde::Serialize;

/// Cumulative counters for a single test across a job's history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestStats {
    /// The canonical identity of the test.
    pub identity: String,

    /// The number of results that were classified into a known bucket.
    ///
    /// This is always the sum of the seven bucket counters below; results with
    /// unknown labels are not included.
    pub observed: usize,

    /// The number of times the test passed.
    pub passes: usize,

    /// The number of times the test was skipped.
    pub skips: usize,

    /// The number of times the test failed.
    pub failures: usize,

    /// The number of expected failures.
    pub xfails: usize,

    /// The number of unexpected passes.
    pub upasses: usize,

    /// The number of errors outside of bad runs.
    pub errors: usize,

    /// The number of errors within bad runs.
    pub spurious: usize,

    /// The number of results with unrecognized labels.
    pub unknown: usize,
}

impl TestStats {
    /// Creates zeroed counters for the given test.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    /// Records one result.
    ///
    /// `kind` is `None` for an unrecognized label. Errors are recorded as
    /// spurious if `bad_run` is true.
    pub fn record(&mut self, kind: Option<ResultKind>, bad_run: bool) {
        let counter = match kind {
            Some(ResultKind::Skip) => &mut self.skips,
            Some(ResultKind::Pass) => &mut self.passes,
            Some(ResultKind::Failure) => &mut self.failures,
            Some(ResultKind::ExpectedFailure) => &mut self.xfails,
            Some(ResultKind::UnexpectedPass) => &mut self.upasses,
            Some(ResultKind::Error) if bad_run => &mut self.spurious,
            Some(ResultKind::Error) => &mut self.errors,
            None => {
                self.unknown += 1;
                return;
            }
        };
        *counter += 1;
        self.observed += 1;
    }

    /// Returns true if the test was skipped every time it was observed.
    ///
    /// This includes tests with no classified results at all.
    pub fn never_ran(&self) -> bool {
        self.observed == self.skips
    }

    /// Returns the truncated percentage of classified results that were
    /// failures or errors.
    ///
    /// Returns `None` if there are no classified results.
    pub fn failure_percent(&self) -> Option<usize> {
        (self.observed > 0).then(|| 100 * (self.failures + self.errors) / self.observed)
    }

    fn absorb(&mut self, other: &TestStats) {
        let TestStats {
            identity: _,
            observed,
            passes,
            skips,
            failures,
            xfails,
            upasses,
            errors,
            spurious,
            unknown,
        } = other;

        self.observed += observed;
        self.passes += passes;
        self.skips += skips;
        self.failures += failures;
        self.xfails += xfails;
        self.upasses += upasses;
        self.errors += errors;
        self.spurious += spurious;
        self.unknown += unknown;
    }
}

/// Accumulated statistics for one CI job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSummary {
    job_name: String,
    runs_processed: usize,
    tests: IndexMap<String, TestStats>,
}

impl JobSummary {
    /// Creates an empty summary for the given job.
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            runs_processed: 0,
            tests: IndexMap::new(),
        }
    }

    /// Returns the name of the job.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Returns the number of runs that were folded into this summary.
    pub fn runs_processed(&self) -> usize {
        self.runs_processed
    }

    /// Returns the statistics for each test, in order of first sighting.
    pub fn tests(&self) -> impl ExactSizeIterator<Item = &TestStats> {
        self.tests.values()
    }

    /// Returns the statistics for a single test.
    pub fn get(&self, identity: &str) -> Option<&TestStats> {
        self.tests.get(identity)
    }

    /// Adds the runs and counters of `other` into this summary.
    ///
    /// Tests first seen in `other` are appended after the tests already
    /// present.
    pub fn merge(&mut self, other: &JobSummary) {
        self.runs_processed += other.runs_processed;
        for (identity, stats) in &other.tests {
            self.stats_mut(identity).absorb(stats);
        }
    }

    pub(crate) fn into_tests(self) -> (String, usize, IndexMap<String, TestStats>) {
        (self.job_name, self.runs_processed, self.tests)
    }

    fn stats_mut(&mut self, identity: &str) -> &mut TestStats {
        // Avoid allocating a key for tests that have already been seen.
        if !self.tests.contains_key(identity) {
            self.tests
                .insert(identity.to_owned(), TestStats::new(identity));
        }
        &mut self.tests[identity]
    }
}

/// The result document of a single run.
#[derive(Clone, Debug)]
pub struct RunDocument {
    /// A label used to identify the run in log messages, e.g. its path.
    pub label: String,

    /// The full text of the document.
    pub contents: String,
}

impl RunDocument {
    /// Creates a new run document.
    pub fn new(label: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            contents: contents.into(),
        }
    }
}

/// Options that control which runs are folded and how.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalysisOptions {
    /// Only runs generated within this range are folded.
    pub date_range: DateRange,

    /// Runs with an error fraction above this threshold are bad runs.
    pub bad_run_threshold: BadRunThreshold,
}

/// What happened to a run passed to [`Aggregator::add_run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunOutcome {
    /// The run was folded into the summary.
    Folded {
        /// The run's error statistics.
        health: RunHealth,
    },

    /// The run had no result rows and was skipped.
    Empty,

    /// A date range is active and the run had no recognizable date. The run
    /// was skipped.
    MissingDate,

    /// The run was generated outside the date range and was skipped.
    OutsideDateRange,
}

impl RunOutcome {
    /// Returns true if the run was folded into the summary.
    pub fn is_folded(&self) -> bool {
        matches!(self, Self::Folded { .. })
    }
}

/// Builds a [`JobSummary`] one run at a time.
#[derive(Debug)]
pub struct Aggregator<E> {
    summary: JobSummary,
    options: AnalysisOptions,
    events: E,
}

impl<E: AnalysisEvents> Aggregator<E> {
    /// Creates a new aggregator for the given job.
    ///
    /// Excluded runs and unknown result labels are reported to `events`.
    pub fn new(job_name: impl Into<String>, options: AnalysisOptions, events: E) -> Self {
        Self {
            summary: JobSummary::new(job_name),
            options,
            events,
        }
    }

    /// Folds a single run into the summary, or skips it.
    pub fn add_run(&mut self, run: &RunDocument) -> RunOutcome {
        let label = run.label.as_str();

        let table = ResultTable::parse(&run.contents);
        if table.is_empty() {
            self.events.empty_run(label);
            return RunOutcome::Empty;
        }

        if self.options.date_range.is_active() {
            let Some(generated) = generated_on(&run.contents).and_then(parse_report_date) else {
                self.events.missing_date(label);
                return RunOutcome::MissingDate;
            };
            if !self.options.date_range.contains(generated) {
                self.events.outside_date_range(label, generated);
                return RunOutcome::OutsideDateRange;
            }
        }

        let classified: Vec<_> = table
            .into_results()
            .into_iter()
            .map(|result| (ResultKind::from_label(result.label), result))
            .collect();

        let Some(health) = RunHealth::assess(
            classified.iter().map(|(kind, _)| *kind),
            self.options.bad_run_threshold,
        ) else {
            // A non-empty table always has results, but don't divide by zero if not.
            self.events.empty_run(label);
            return RunOutcome::Empty;
        };
        if health.is_bad() {
            self.events.bad_run(label, health.error_percent());
        }

        self.summary.runs_processed += 1;
        for (kind, result) in &classified {
            self.summary
                .stats_mut(&result.identity)
                .record(*kind, health.is_bad());
            if kind.is_none() {
                self.events
                    .unknown_label(label, result.label, &result.identity);
            }
        }

        RunOutcome::Folded { health }
    }

    /// Folds each of the given runs in turn.
    ///
    /// Returns the number of runs that were folded.
    pub fn add_runs<'a>(&mut self, runs: impl IntoIterator<Item = &'a RunDocument>) -> usize {
        runs.into_iter()
            .map(|run| self.add_run(run))
            .filter(RunOutcome::is_folded)
            .count()
    }

    /// Returns the summary built so far.
    pub fn summary(&self) -> &JobSummary {
        &self.summary
    }

    /// Consumes the aggregator, returning the summary.
    pub fn finish(self) -> JobSummary {
        self.summary
    }
}
