// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The on-disk store of cached run documents.
//!
//! The store is laid out as:
//!
//! ```text
//! <root>/
//!   <job>/
//!     <build-number>/
//!       <report-file-name>
//! ```
//!
//! Build directories are named by their decimal build number. Anything else in
//! a job directory is ignored.

use crate::{aggregate::RunDocument, errors::RunStoreError};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use tracing::{debug, warn};

/// A directory of cached run documents, grouped by job.
#[derive(Clone, Debug)]
pub struct RunStore {
    root: Utf8PathBuf,
    report_file_name: String,
}

impl RunStore {
    /// Creates a store rooted at `root`, whose build directories contain
    /// reports named `report_file_name`.
    pub fn new(root: impl Into<Utf8PathBuf>, report_file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            report_file_name: report_file_name.into(),
        }
    }

    /// Returns the root directory of the store.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the directory holding the builds of `job`.
    pub fn job_dir(&self, job: &str) -> Utf8PathBuf {
        self.root.join(job)
    }

    /// Lists the builds of `job` that have a report, in ascending order of
    /// build number.
    ///
    /// Report contents are not read.
    pub fn builds(&self, job: &str) -> Result<Vec<StoredBuild>, RunStoreError> {
        let job_dir = self.job_dir(job);
        let entries = job_dir
            .read_dir_utf8()
            .map_err(|error| RunStoreError::new(job, &job_dir, error))?;

        let mut builds = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| RunStoreError::new(job, &job_dir, error))?;
            let entry_path = entry.path();

            let Ok(build) = entry.file_name().parse::<u64>() else {
                debug!("ignoring {entry_path}: not a build directory");
                continue;
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => {}
                Ok(_) => {
                    debug!("ignoring {entry_path}: not a directory");
                    continue;
                }
                Err(error) => {
                    warn!("ignoring {entry_path}: failed to read file type: {error}");
                    continue;
                }
            }

            let report_path = entry_path.join(&self.report_file_name);
            if !report_path.is_file() {
                debug!("ignoring build {build} of {job}: no report at {report_path}");
                continue;
            }

            builds.push(StoredBuild {
                build,
                report_path,
            });
        }

        builds.sort_unstable_by_key(|build| build.build);
        Ok(builds)
    }

    /// Reads the reports of every build of `job`, in ascending order of build
    /// number.
    ///
    /// A report that cannot be read is logged and skipped. Reports are decoded
    /// as UTF-8, with invalid sequences replaced.
    pub fn runs(&self, job: &str) -> Result<Vec<StoredRun>, RunStoreError> {
        let builds = self.builds(job)?;
        debug!("found {} builds for {job} in {}", builds.len(), self.root);

        let runs = builds
            .into_iter()
            .filter_map(|build| match build.read() {
                Ok(run) => Some(run),
                Err(error) => {
                    warn!("skipping {}: {error}", build.report_path);
                    None
                }
            })
            .collect();
        Ok(runs)
    }
}

/// A build in the store that has a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBuild {
    /// The build number.
    pub build: u64,

    /// The path to the build's report.
    pub report_path: Utf8PathBuf,
}

impl StoredBuild {
    /// Reads the build's report.
    pub fn read(&self) -> io::Result<StoredRun> {
        let bytes = std::fs::read(&self.report_path)?;
        let contents = String::from_utf8_lossy(&bytes).into_owned();
        Ok(StoredRun {
            build: self.build,
            document: RunDocument::new(self.report_path.as_str(), contents),
        })
    }
}

/// A run read from the store.
#[derive(Clone, Debug)]
pub struct StoredRun {
    /// The build number.
    pub build: u64,

    /// The run's report, labeled with its path.
    pub document: RunDocument,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::{Utf8TempDir, tempdir};
    use pretty_assertions::assert_eq;

    fn write_report(root: &Utf8Path, job: &str, build: &str, contents: &str) {
        let dir = root.join(job).join(build);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("output.html"), contents).unwrap();
    }

    fn store_with_builds(builds: &[&str]) -> Utf8TempDir {
        let temp_dir = tempdir().unwrap();
        for build in builds {
            write_report(temp_dir.path(), "smoke", build, &format!("build {build}"));
        }
        temp_dir
    }

    #[test]
    fn builds_are_sorted_numerically() {
        let temp_dir = store_with_builds(&["10", "9", "100", "2"]);
        let store = RunStore::new(temp_dir.path(), "output.html");

        let builds: Vec<_> = store
            .builds("smoke")
            .unwrap()
            .into_iter()
            .map(|build| build.build)
            .collect();
        assert_eq!(builds, vec![2, 9, 10, 100]);
    }

    #[test]
    fn non_build_entries_are_ignored() {
        let temp_dir = store_with_builds(&["1", "lastSuccessfulBuild", "3"]);
        let job_dir = temp_dir.path().join("smoke");
        std::fs::write(job_dir.join("4"), "a file, not a directory").unwrap();
        std::fs::create_dir(job_dir.join("5")).unwrap();

        let store = RunStore::new(temp_dir.path(), "output.html");
        let runs = store.runs("smoke").unwrap();
        let builds: Vec<_> = runs.iter().map(|run| run.build).collect();
        assert_eq!(builds, vec![1, 3]);
        assert_eq!(runs[1].document.contents, "build 3");
        assert_eq!(
            runs[1].document.label,
            job_dir.join("3").join("output.html").as_str()
        );
    }

    #[test]
    fn custom_report_file_name() {
        let temp_dir = store_with_builds(&["1"]);
        let dir = temp_dir.path().join("smoke").join("2");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "build 2").unwrap();

        let store = RunStore::new(temp_dir.path(), "index.html");
        let builds: Vec<_> = store
            .builds("smoke")
            .unwrap()
            .into_iter()
            .map(|build| build.build)
            .collect();
        assert_eq!(builds, vec![2]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("smoke").join("1");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("output.html"), b"ok \xff ok").unwrap();

        let store = RunStore::new(temp_dir.path(), "output.html");
        let runs = store.runs("smoke").unwrap();
        assert_eq!(runs[0].document.contents, "ok \u{fffd} ok");
    }

    #[test]
    fn missing_job_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let store = RunStore::new(temp_dir.path(), "output.html");

        let error = store.runs("nonexistent").expect_err("job dir is missing");
        assert_eq!(error.job(), "nonexistent");
    }
}
