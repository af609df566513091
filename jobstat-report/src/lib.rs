// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [jobstat](https://crates.io/crates/jobstat): per-test
//! failure statistics aggregated across the run history of a CI job.
//!
//! The basic flow is:
//!
//! 1. [`store::RunStore`] lists the cached result documents for a job.
//! 2. [`parse::ResultTable`] extracts result rows from each document, and
//!    [`classify::ResultKind`] maps each row's label to a bucket.
//! 3. [`aggregate::Aggregator`] folds each run into a [`aggregate::JobSummary`],
//!    treating errors in bad runs (see [`bad_run`]) as spurious.
//! 4. [`rank::RankedSummary`] drops never-run tests and orders the rest by
//!    failure percentage.

pub mod aggregate;
pub mod bad_run;
pub mod classify;
pub mod config;
pub mod date_range;
pub mod display;
pub mod errors;
pub mod events;
mod helpers;
pub mod identity;
pub mod parse;
pub mod rank;
pub mod store;
