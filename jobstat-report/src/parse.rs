// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of result rows from a run's HTML report.
//!
//! Two report layouts exist in job histories:
//!
//! * **Legacy** reports have three cells per row: the result label, a dotted
//!   `file.Class` path (possibly empty), and the test name.
//! * **Current** reports have two cells per row: the result label and the
//!   test name.
//!
//! The layout is decided once per document. A document that mentions the
//! legacy class cell anywhere is parsed entirely as legacy. Markup that does
//! not match the active layout's row pattern is ignored.

use crate::identity::{current_identity, legacy_identity};
use regex::Regex;
use std::sync::LazyLock;

/// The cell class that only appears in legacy reports.
static LEGACY_MARKER: &str = "col-class";

static LEGACY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<td class="col-result">([a-zA-Z ]+)</td>\s*"#,
        r#"<td class="col-class">([\w\.]*)</td>\s*"#,
        r#"<td class="col-name">(.+)</td>"#,
    ))
    .expect("legacy row pattern is valid")
});

static CURRENT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<td class="col-result">([a-zA-Z ]+)</td>\s*"#,
        r#"<td class="col-name">(.+)</td>"#,
    ))
    .expect("current row pattern is valid")
});

/// A row from a legacy report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyRow<'a> {
    /// The trimmed result label, e.g. `Passed`.
    pub label: &'a str,

    /// The trimmed dotted class path, e.g. `test_settings.TestSettings`. May be empty.
    pub class_path: &'a str,

    /// The trimmed test name.
    pub name: &'a str,
}

/// A row from a current report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentRow<'a> {
    /// The trimmed result label, e.g. `PASS`.
    pub label: &'a str,

    /// The trimmed test name, e.g. `test_settings.py TestSettings.test_wifi`.
    pub name: &'a str,
}

/// The result rows of one report, tagged with the layout they were parsed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultTable<'a> {
    /// The report used the legacy three-cell layout.
    Legacy(Vec<LegacyRow<'a>>),

    /// The report used the current two-cell layout.
    Current(Vec<CurrentRow<'a>>),
}

impl<'a> ResultTable<'a> {
    /// Detects the layout of `document` and extracts its rows in document order.
    pub fn parse(document: &'a str) -> Self {
        if document.contains(LEGACY_MARKER) {
            let rows = LEGACY_ROW
                .captures_iter(document)
                .map(|caps| {
                    let (_, [label, class_path, name]) = caps.extract();
                    LegacyRow {
                        label: label.trim(),
                        class_path: class_path.trim(),
                        name: name.trim(),
                    }
                })
                .collect();
            Self::Legacy(rows)
        } else {
            let rows = CURRENT_ROW
                .captures_iter(document)
                .map(|caps| {
                    let (_, [label, name]) = caps.extract();
                    CurrentRow {
                        label: label.trim(),
                        name: name.trim(),
                    }
                })
                .collect();
            Self::Current(rows)
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Legacy(rows) => rows.len(),
            Self::Current(rows) => rows.len(),
        }
    }

    /// Returns true if the document contained no result rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the rows into results keyed by canonical test identity.
    pub fn into_results(self) -> Vec<RawResult<'a>> {
        match self {
            Self::Legacy(rows) => rows
                .into_iter()
                .map(|row| RawResult {
                    identity: legacy_identity(row.class_path, row.name),
                    label: row.label,
                })
                .collect(),
            Self::Current(rows) => rows
                .into_iter()
                .map(|row| RawResult {
                    identity: current_identity(row.name),
                    label: row.label,
                })
                .collect(),
        }
    }
}

/// A single result from a report, before classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResult<'a> {
    /// The canonical test identity.
    pub identity: String,

    /// The result label as it appeared in the report.
    pub label: &'a str,
}

/// Returns the text following the first `Report generated on ... at` marker, if any.
pub fn generated_on(document: &str) -> Option<&str> {
    static GENERATED_ON: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"Report generated on (.+) at").expect("generated-on pattern is valid")
    });

    GENERATED_ON
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use swrite::{SWrite, swrite};

    /// Renders a current-layout report with the given `(label, name)` rows.
    pub(crate) fn current_document(rows: &[(&str, &str)]) -> String {
        let mut document = String::from("<table id=\"results-table\">\n");
        for (label, name) in rows {
            swrite!(
                document,
                "<tr><td class=\"col-result\">{label}</td><td class=\"col-name\">{name}</td></tr>\n"
            );
        }
        document.push_str("</table>\n");
        document
    }

    /// Renders a legacy-layout report with the given `(label, class path, name)` rows.
    pub(crate) fn legacy_document(rows: &[(&str, &str, &str)]) -> String {
        let mut document = String::from("<table id=\"results-table\">\n");
        for (label, class_path, name) in rows {
            swrite!(
                document,
                "<tr><td class=\"col-result\">{label}</td>\
                 <td class=\"col-class\">{class_path}</td>\
                 <td class=\"col-name\">{name}</td></tr>\n"
            );
        }
        document.push_str("</table>\n");
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_legacy_rows() {
        let document = indoc! {r#"
            <table id="results-table">
            <tr class="passed results-table-row">
              <td class="col-result">Passed</td>
              <td class="col-class">test_settings.TestSettings</td>
              <td class="col-name">test_wifi</td>
            </tr>
            <tr class="error results-table-row">
              <td class="col-result"> Error </td>
              <td class="col-class"></td>
              <td class="col-name"> test_boot </td>
            </tr>
            </table>
        "#};

        let table = ResultTable::parse(document);
        assert_eq!(
            table,
            ResultTable::Legacy(vec![
                LegacyRow {
                    label: "Passed",
                    class_path: "test_settings.TestSettings",
                    name: "test_wifi",
                },
                LegacyRow {
                    label: "Error",
                    class_path: "",
                    name: "test_boot",
                },
            ])
        );

        let results = table.into_results();
        assert_eq!(
            results,
            vec![
                RawResult {
                    identity: "test_settings.py TestSettings.test_wifi".to_owned(),
                    label: "Passed",
                },
                RawResult {
                    identity: "test_boot".to_owned(),
                    label: "Error",
                },
            ]
        );
    }

    #[test]
    fn parse_current_rows() {
        let document = indoc! {r#"
            <h1>output.html</h1>
            <p>Report generated on 03-Nov-2014 at 14:35:12</p>
            <tr><td class="col-result">PASS</td><td class="col-name">test_a.py TestA.test_one</td></tr>
            <tr><td class="col-result">Expected Failure</td>
                <td class="col-name">test_b.py</td></tr>
            <tr><td class="col-duration">1.2</td></tr>
        "#};

        let table = ResultTable::parse(document);
        assert_eq!(
            table,
            ResultTable::Current(vec![
                CurrentRow {
                    label: "PASS",
                    name: "test_a.py TestA.test_one",
                },
                CurrentRow {
                    label: "Expected Failure",
                    name: "test_b.py",
                },
            ])
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn legacy_marker_applies_to_whole_document() {
        // The second row has no class cell, so it doesn't match the legacy pattern.
        let document = indoc! {r#"
            <td class="col-result">Passed</td><td class="col-class">a.B</td><td class="col-name">test_x</td>
            <td class="col-result">Passed</td><td class="col-name">test_y</td>
        "#};

        let table = ResultTable::parse(document);
        assert!(matches!(&table, ResultTable::Legacy(rows) if rows.len() == 1));
    }

    #[test]
    fn unrelated_markup_yields_empty_table() {
        let table = ResultTable::parse("<html><body>build aborted</body></html>");
        assert!(table.is_empty());
        assert_eq!(table, ResultTable::Current(Vec::new()));
    }

    #[test]
    fn generated_on_marker() {
        assert_eq!(
            generated_on("<p>Report generated on 03-Nov-2014 at 14:35:12 by pytest-html</p>"),
            Some("03-Nov-2014"),
        );
        assert_eq!(generated_on("<p>no date here</p>"), None);
    }
}
