// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to the verdicts produced by a suite scoreboard.
//!
//! The types in this crate are what reporting and dashboard code consumes: the per-test
//! [`TestStatus`] classification, the [`SuiteCounts`] aggregate counters along with the overall
//! suite verdict, and [`ScoreboardSummary`], a frozen, serializable picture of an entire
//! scoreboard.

mod errors;
mod status;
mod summary;

pub use errors::*;
pub use status::*;
pub use summary::*;
