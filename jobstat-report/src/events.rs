// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifications emitted while runs are folded into a job summary.
//!
//! None of these conditions stop an analysis. The [`Aggregator`] reports them
//! through an [`AnalysisEvents`] implementation and carries on with the next
//! result or run.
//!
//! [`Aggregator`]: crate::aggregate::Aggregator

use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Receives notifications about excluded runs and results.
///
/// `run` is the label of the run document, typically the path it was read from.
pub trait AnalysisEvents {
    /// A run document contained no result rows and was skipped.
    fn empty_run(&mut self, run: &str);

    /// A date range is active, but the run document has no recognizable
    /// generation date. The run was skipped.
    fn missing_date(&mut self, run: &str);

    /// The run was generated outside the active date range and was skipped.
    fn outside_date_range(&mut self, run: &str, generated: NaiveDateTime);

    /// The run's error rate was above the bad-run threshold, so its errors are
    /// recorded as spurious.
    fn bad_run(&mut self, run: &str, error_percent: f64);

    /// A result label didn't match any known bucket. The result was counted as
    /// unknown.
    fn unknown_label(&mut self, run: &str, label: &str, identity: &str);
}

impl<E: AnalysisEvents + ?Sized> AnalysisEvents for &mut E {
    fn empty_run(&mut self, run: &str) {
        (**self).empty_run(run)
    }

    fn missing_date(&mut self, run: &str) {
        (**self).missing_date(run)
    }

    fn outside_date_range(&mut self, run: &str, generated: NaiveDateTime) {
        (**self).outside_date_range(run, generated)
    }

    fn bad_run(&mut self, run: &str, error_percent: f64) {
        (**self).bad_run(run, error_percent)
    }

    fn unknown_label(&mut self, run: &str, label: &str, identity: &str) {
        (**self).unknown_label(run, label, identity)
    }
}

/// The default [`AnalysisEvents`] implementation, which logs through `tracing`.
///
/// Skipped runs outside the date range are logged at debug level; everything
/// else is a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAnalysisEvents;

impl AnalysisEvents for LogAnalysisEvents {
    fn empty_run(&mut self, run: &str) {
        warn!("no tests found in {run}");
    }

    fn missing_date(&mut self, run: &str) {
        warn!("no date found in {run}");
    }

    fn outside_date_range(&mut self, run: &str, generated: NaiveDateTime) {
        debug!("skipping {run}: generated on {generated}, outside of requested date range");
    }

    fn bad_run(&mut self, run: &str, error_percent: f64) {
        warn!("{run} is possibly a bad run ({}% errors)", error_percent as u64);
    }

    fn unknown_label(&mut self, run: &str, label: &str, identity: &str) {
        warn!("unknown result: {label} for {identity} in {run}");
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    /// A single recorded event.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum RecordedEvent {
        EmptyRun(String),
        MissingDate(String),
        OutsideDateRange(String),
        BadRun(String, u64),
        UnknownLabel {
            run: String,
            label: String,
            identity: String,
        },
    }

    /// Collects events for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEvents {
        pub(crate) events: Vec<RecordedEvent>,
    }

    impl AnalysisEvents for RecordingEvents {
        fn empty_run(&mut self, run: &str) {
            self.events.push(RecordedEvent::EmptyRun(run.to_owned()));
        }

        fn missing_date(&mut self, run: &str) {
            self.events.push(RecordedEvent::MissingDate(run.to_owned()));
        }

        fn outside_date_range(&mut self, run: &str, _generated: NaiveDateTime) {
            self.events
                .push(RecordedEvent::OutsideDateRange(run.to_owned()));
        }

        fn bad_run(&mut self, run: &str, error_percent: f64) {
            self.events
                .push(RecordedEvent::BadRun(run.to_owned(), error_percent as u64));
        }

        fn unknown_label(&mut self, run: &str, label: &str, identity: &str) {
            self.events.push(RecordedEvent::UnknownLabel {
                run: run.to_owned(),
                label: label.to_owned(),
                identity: identity.to_owned(),
            });
        }
    }
}
