// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scoreboard for a single suite run.
//!
//! A [`Scoreboard`] tracks which tests have been registered, started and completed across
//! restarts of the process running them. It classifies each test against its expectation, keeps
//! aggregate counters, and decides which tests are candidates for a flaky retry or should be
//! blacklisted for hanging.

mod imp;
mod test_state;

pub use imp::*;
