// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Result bookkeeping for integration test suites that are run in a separate, crash-prone
//! process and restarted when it hangs or dies.
//!
//! The driving loop feeds a [`Scoreboard`](scoreboard::Scoreboard) with the tests it registers,
//! starts and gets results for. The scoreboard classifies every test against its
//! [expectation](expectation::ExpectationFlags), offers flaky tests a single retry, blacklists
//! tests that keep hanging across restarts, and settles on an overall verdict for the suite.
//!
//! Serializable verdicts and counters live in [`suite_scoreboard_metadata`], re-exported here as
//! [`metadata`].

pub mod config;
pub mod errors;
pub mod expectation;
pub mod reporter;
pub mod result;
pub mod scoreboard;
pub mod test_filter;

pub use suite_scoreboard_metadata as metadata;
