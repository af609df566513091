// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Restricting an analysis to runs generated within a date range.

use crate::errors::DateBoundParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::str::FromStr;

/// Formats accepted for both date bounds and report timestamps.
static DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Date-only formats accepted for date bounds.
static ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

/// Additional date-only formats seen in report headers, e.g. `03-Nov-2014`.
static REPORT_DATE_FORMATS: &[&str] = &["%d-%b-%Y", "%d %b %Y", "%d-%B-%Y", "%d %B %Y"];

/// A lower bound, an upper bound, or both, on the generation time of a run.
///
/// Both bounds are inclusive. A date without a time means midnight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    from: Option<DateBound>,
    to: Option<DateBound>,
}

impl DateRange {
    /// Creates a new date range.
    pub fn new(from: Option<DateBound>, to: Option<DateBound>) -> Self {
        Self { from, to }
    }

    /// Returns true if at least one bound is set.
    ///
    /// Runs are only checked for a generation date if this is true.
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Returns true if `generated` falls within this range.
    pub fn contains(&self, generated: NaiveDateTime) -> bool {
        let after_from = self.from.is_none_or(|from| from.0 <= generated);
        let before_to = self.to.is_none_or(|to| generated <= to.0);
        after_from && before_to
    }

    /// Returns a short description of the range, e.g. `from 2014-10-01 to 2014-11-01`.
    ///
    /// Returns `None` if the range is not active.
    pub fn describe(&self) -> Option<String> {
        match (self.from, self.to) {
            (None, None) => None,
            (Some(from), None) => Some(format!("from {}", from.0.date())),
            (None, Some(to)) => Some(format!("to {}", to.0.date())),
            (Some(from), Some(to)) => Some(format!("from {} to {}", from.0.date(), to.0.date())),
        }
    }
}

/// One end of a [`DateRange`], parsed from an ISO-style string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateBound(NaiveDateTime);

impl DateBound {
    /// Returns the bound as a date and time.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for DateBound {
    type Err = DateBoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with(s.trim(), ISO_DATE_FORMATS)
            .map(Self)
            .ok_or_else(|| DateBoundParseError::new(s))
    }
}

/// Parses the generation date captured from a report header.
///
/// Returns `None` if the text isn't in a recognized format.
pub fn parse_report_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    parse_with(s, ISO_DATE_FORMATS).or_else(|| parse_with(s, REPORT_DATE_FORMATS))
}

fn parse_with(s: &str, date_formats: &[&str]) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
