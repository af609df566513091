// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable display of a ranked job summary.

use crate::{
    date_range::DateRange,
    helpers::plural,
    identity::abbreviate,
    rank::{RankedSummary, RankedTest},
};
use owo_colors::{OwoColorize, Style};
use std::fmt;

/// Styles for displaying a job report.
#[derive(Clone, Debug, Default)]
pub struct Styles {
    /// Style for the job header.
    pub header: Style,
    /// Style for counts in the summary line.
    pub count: Style,
    /// Style for tests that never failed.
    pub passed: Style,
    /// Style for tests that failed at least once.
    pub failed: Style,
}

impl Styles {
    /// Colorizes the styles for terminal output.
    pub fn colorize(&mut self) {
        self.header = Style::new().bold();
        self.count = Style::new().bold();
        self.passed = Style::new().bold().green();
        self.failed = Style::new().bold().red();
    }
}

/// How test identities are shown in the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// Show `method` for identities of the form `file.py Class.method`.
    #[default]
    Abbreviated,

    /// Show the full canonical identity.
    Full,
}

impl NameStyle {
    fn apply(self, identity: &str) -> &str {
        match self {
            Self::Abbreviated => abbreviate(identity),
            Self::Full => identity,
        }
    }
}

/// Display wrapper for a [`RankedSummary`].
///
/// Created by [`RankedSummary::display`].
#[derive(Clone, Debug)]
pub struct DisplayRankedSummary<'a> {
    summary: &'a RankedSummary,
    date_range: &'a DateRange,
    name_style: NameStyle,
    styles: &'a Styles,
}

impl<'a> DisplayRankedSummary<'a> {
    pub(crate) fn new(
        summary: &'a RankedSummary,
        date_range: &'a DateRange,
        name_style: NameStyle,
        styles: &'a Styles,
    ) -> Self {
        Self {
            summary,
            date_range,
            name_style,
            styles,
        }
    }

    fn header(&self) -> String {
        match self.date_range.describe() {
            Some(range) => format!("{} ({range})", self.summary.job_name),
            None => self.summary.job_name.clone(),
        }
    }

    fn fmt_test(
        &self,
        test: &RankedTest,
        name_width: usize,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let RankedTest {
            stats,
            failure_percent,
        } = test;
        let name = self.name_style.apply(&stats.identity);
        // Two spaces of padding after the longest name.
        let padding = name_width + 2 - name.chars().count();

        write!(
            f,
            "  {name}(){:padding$}: {:4} runs, {:4} skips, {:4} passes, {:4} failures, \
             {:4} xfails, {:4} upasses, {:4} errors, {:4} spurious, ",
            "",
            stats.observed,
            stats.skips,
            stats.passes,
            stats.failures,
            stats.xfails,
            stats.upasses,
            stats.errors,
            stats.spurious,
        )?;

        let style = if *failure_percent == 0 {
            self.styles.passed
        } else {
            self.styles.failed
        };
        writeln!(f, "({}% failed)", failure_percent.style(style))
    }
}

impl fmt::Display for DisplayRankedSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        let rule = "-".repeat(header.chars().count());

        writeln!(f, "{rule}")?;
        writeln!(f, "{}", header.style(self.styles.header))?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;

        let test_count = self.summary.tests.len();
        let run_count = self.summary.runs_processed;
        writeln!(
            f,
            "{} {} found in {} {}.",
            test_count.style(self.styles.count),
            plural::tests_str(test_count),
            run_count.style(self.styles.count),
            plural::runs_str(run_count),
        )?;

        if test_count == 0 {
            return Ok(());
        }
        writeln!(f)?;

        let name_width = self
            .summary
            .tests
            .iter()
            .map(|test| self.name_style.apply(&test.stats.identity).chars().count())
            .max()
            .unwrap_or(0);
        for test in &self.summary.tests {
            self.fmt_test(test, name_width, f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::{AnalysisOptions, Aggregator, RunDocument},
        date_range::DateBound,
        events::test_helpers::RecordingEvents,
        parse::test_helpers::current_document,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn summary() -> RankedSummary {
        let mut aggregator = Aggregator::new(
            "b2g.ui.functional.smoke",
            AnalysisOptions::default(),
            RecordingEvents::default(),
        );
        aggregator.add_run(&RunDocument::new(
            "1",
            current_document(&[
                ("PASS", "test_settings.py TestSettings.test_wifi"),
                ("FAIL", "test_boot.py"),
                ("Expected Failure", "test_camera.py TestCamera.test_flash"),
            ]),
        ));
        aggregator.add_run(&RunDocument::new(
            "2",
            current_document(&[
                ("PASS", "test_settings.py TestSettings.test_wifi"),
                ("PASS", "test_boot.py"),
                ("SKIP", "test_camera.py TestCamera.test_flash"),
            ]),
        ));
        RankedSummary::new(aggregator.finish())
    }

    #[test]
    fn abbreviated_names() {
        let summary = summary();
        let output = summary
            .display(&DateRange::default(), NameStyle::Abbreviated, &Styles::default())
            .to_string();

        assert_eq!(
            output,
            indoc! {"
                -----------------------
                b2g.ui.functional.smoke
                -----------------------

                3 tests found in 2 runs.

                  test_wifi()     :    2 runs,    0 skips,    2 passes,    0 failures,    0 xfails,    0 upasses,    0 errors,    0 spurious, (0% failed)
                  test_flash()    :    2 runs,    1 skips,    0 passes,    0 failures,    1 xfails,    0 upasses,    0 errors,    0 spurious, (0% failed)
                  test_boot.py()  :    2 runs,    0 skips,    1 passes,    1 failures,    0 xfails,    0 upasses,    0 errors,    0 spurious, (50% failed)
            "}
        );
    }

    #[test]
    fn full_names_with_date_range() {
        let summary = summary();
        let from: DateBound = "2014-11-01".parse().unwrap();
        let date_range = DateRange::new(Some(from), None);
        let output = summary
            .display(&date_range, NameStyle::Full, &Styles::default())
            .to_string();

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("-".repeat(41).as_str()));
        assert_eq!(
            lines.next(),
            Some("b2g.ui.functional.smoke (from 2014-11-01)")
        );
        assert!(
            output.contains("  test_camera.py TestCamera.test_flash()     :    2 runs,"),
            "output was:\n{output}"
        );
    }

    #[test]
    fn empty_summary() {
        let summary = RankedSummary {
            job_name: "job".to_owned(),
            runs_processed: 1,
            tests: Vec::new(),
        };
        let output = summary
            .display(&DateRange::default(), NameStyle::Abbreviated, &Styles::default())
            .to_string();
        assert_eq!(output, "---\njob\n---\n\n0 tests found in 1 run.\n");
    }
}
