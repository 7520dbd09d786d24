// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcomes of individual test attempts.

use std::time::Duration;

/// The outcome of a single attempt at running a test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TestOutcome {
    /// The test passed.
    Pass,

    /// The test failed.
    Fail,
}

/// The result of one executed attempt of a test, as parsed from the test process's output.
#[derive(Clone, Debug, PartialEq)]
pub struct TestMethodResult {
    /// The name of the test.
    pub name: String,

    /// Whether the attempt passed or failed.
    pub outcome: TestOutcome,

    /// The wall-clock time the attempt took.
    pub duration: Duration,
}

impl TestMethodResult {
    /// Creates a new result with no duration.
    pub fn new(name: impl Into<String>, outcome: TestOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            duration: Duration::ZERO,
        }
    }

    /// Creates a new passing result.
    pub fn pass(name: impl Into<String>) -> Self {
        Self::new(name, TestOutcome::Pass)
    }

    /// Creates a new failing result.
    pub fn fail(name: impl Into<String>) -> Self {
        Self::new(name, TestOutcome::Fail)
    }

    /// Sets the duration of this attempt.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the duration of this attempt from a number of seconds.
    ///
    /// Negative or non-finite values, which can show up in parsed output when clocks misbehave,
    /// are recorded as zero.
    pub fn with_duration_secs(self, secs: f64) -> Self {
        let duration = Duration::try_from_secs_f64(secs).unwrap_or_default();
        self.with_duration(duration)
    }
}
